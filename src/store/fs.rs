use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use super::{AudioArtifact, AudioStore, AudioStream, NameSequence, StoreError, FILE_EXT};

/// Audio storage backed by a directory of MP3 files. File presence on disk is
/// the only registry; nothing is tracked in memory besides the name sequence.
pub struct FsAudioStore {
    dir: PathBuf,
    names: NameSequence,
}

impl FsAudioStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            names: NameSequence::new(),
        }
    }
}

#[async_trait]
impl AudioStore for FsAudioStore {
    async fn write(&self, bytes: Bytes) -> Result<AudioArtifact, StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let file_name = self.names.next();
        let path = self.dir.join(&file_name);
        tokio::fs::write(&path, &bytes).await?;

        tracing::debug!("Wrote {} bytes to {}", bytes.len(), path.display());

        Ok(AudioArtifact {
            url_path: format!("/audio/{file_name}"),
            file_name,
        })
    }

    async fn open(&self, name: &str) -> Result<AudioStream, StoreError> {
        let path = self.dir.join(name);
        let file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let len = file.metadata().await?.len();

        Ok(AudioStream {
            len,
            reader: Box::new(file),
        })
    }

    async fn purge(&self, max_age: Duration) -> Result<usize, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            // Nothing ever written, nothing to purge
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut deleted = 0;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_audio = path
                .extension()
                .map(|ext| ext == &FILE_EXT[1..])
                .unwrap_or(false);
            if !is_audio {
                continue;
            }

            // A listed file may already be gone by the time it is stat'ed;
            // that counts as purged by someone else, not a failure
            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            let modified = match metadata.modified() {
                Ok(modified) => modified,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            // A modification time in the future reads as age zero
            let age = modified.elapsed().unwrap_or_default();
            if age <= max_age {
                continue;
            }

            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    tracing::debug!("Purged stale audio file {}", path.display());
                    deleted += 1;
                }
                // Deleted concurrently, which is the outcome we wanted
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    fn store(dir: &tempfile::TempDir) -> FsAudioStore {
        FsAudioStore::new(dir.path().to_path_buf())
    }

    #[tokio::test]
    async fn rapid_writes_get_distinct_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        let a = store.write(Bytes::from_static(b"aa")).await.unwrap();
        let b = store.write(Bytes::from_static(b"bb")).await.unwrap();

        assert_ne!(a.file_name, b.file_name);
        assert!(dir.path().join(&a.file_name).exists());
        assert!(dir.path().join(&b.file_name).exists());
    }

    #[tokio::test]
    async fn written_bytes_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        let artifact = store.write(Bytes::from_static(b"mp3 bytes")).await.unwrap();
        let mut stream = store.open(&artifact.file_name).await.unwrap();

        assert_eq!(stream.len, 9);
        let mut buf = Vec::new();
        stream.reader.read_to_end(&mut buf).await.unwrap();
        assert_eq!(buf, b"mp3 bytes");
    }

    #[tokio::test]
    async fn opening_a_name_never_written_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = store(&dir).open("response_0.mp3").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn purge_spares_fresh_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let artifact = store.write(Bytes::from_static(b"x")).await.unwrap();

        let deleted = store.purge(Duration::from_secs(3600)).await.unwrap();

        assert_eq!(deleted, 0);
        assert!(dir.path().join(&artifact.file_name).exists());
    }

    #[tokio::test]
    async fn purge_removes_only_stale_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        let stale = store.write(Bytes::from_static(b"old")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        let fresh = store.write(Bytes::from_static(b"new")).await.unwrap();

        let deleted = store.purge(Duration::from_millis(150)).await.unwrap();

        assert_eq!(deleted, 1);
        assert!(!dir.path().join(&stale.file_name).exists());
        assert!(dir.path().join(&fresh.file_name).exists());
    }

    // A dangling symlink stats like a file deleted between list and stat
    #[cfg(unix)]
    #[tokio::test]
    async fn purge_skips_entries_that_vanish_before_stat() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let stale = store.write(Bytes::from_static(b"old")).await.unwrap();
        std::os::unix::fs::symlink(
            dir.path().join("response_gone.mp3"),
            dir.path().join("response_1.mp3"),
        )
        .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let deleted = store.purge(Duration::ZERO).await.unwrap();

        assert_eq!(deleted, 1);
        assert!(!dir.path().join(&stale.file_name).exists());
    }

    #[tokio::test]
    async fn purge_ignores_non_audio_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        std::fs::write(dir.path().join("notes.txt"), b"keep me").unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let deleted = store.purge(Duration::ZERO).await.unwrap();

        assert_eq!(deleted, 0);
        assert!(dir.path().join("notes.txt").exists());
    }

    #[tokio::test]
    async fn purge_of_a_missing_directory_deletes_nothing() {
        let store = FsAudioStore::new("/nonexistent/audio-dir".into());
        assert_eq!(store.purge(Duration::ZERO).await.unwrap(), 0);
    }
}
