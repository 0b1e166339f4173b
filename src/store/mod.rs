pub mod fs;
#[cfg(test)]
pub mod mem;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncSeek};

pub use fs::FsAudioStore;

pub const FILE_PREFIX: &str = "response_";
pub const FILE_EXT: &str = ".mp3";

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("No such audio file: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A stored audio file, addressed by name and by the URL path it is served at.
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    pub file_name: String,
    pub url_path: String,
}

pub trait AudioReader: AsyncRead + AsyncSeek + Send + Unpin {}
impl<T: AsyncRead + AsyncSeek + Send + Unpin> AudioReader for T {}

/// A seekable handle to stored audio, for streaming and range requests.
pub struct AudioStream {
    pub len: u64,
    pub reader: Box<dyn AudioReader>,
}

impl std::fmt::Debug for AudioStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioStream").field("len", &self.len).finish_non_exhaustive()
    }
}

/// Storage for generated audio. Injected into the HTTP layer so tests can
/// substitute an in-memory implementation.
#[async_trait]
pub trait AudioStore: Send + Sync {
    /// Persists audio bytes under a fresh time-based name.
    async fn write(&self, bytes: Bytes) -> Result<AudioArtifact, StoreError>;

    /// Opens a stored file for streaming.
    async fn open(&self, name: &str) -> Result<AudioStream, StoreError>;

    /// Deletes every audio file older than `max_age`, returning the count
    /// removed. A file vanishing mid-pass counts as already deleted.
    async fn purge(&self, max_age: Duration) -> Result<usize, StoreError>;
}

/// Issues `response_<epoch-millis>.mp3` names that stay strictly distinct
/// even when two writes land in the same millisecond.
pub struct NameSequence {
    last_millis: AtomicU64,
}

impl NameSequence {
    pub fn new() -> Self {
        Self {
            last_millis: AtomicU64::new(0),
        }
    }

    pub fn next(&self) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let mut issued = now;
        let _ = self
            .last_millis
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                issued = now.max(last + 1);
                Some(issued)
            });

        format!("{FILE_PREFIX}{issued}{FILE_EXT}")
    }
}

impl Default for NameSequence {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_distinct_within_one_millisecond() {
        let seq = NameSequence::new();
        let a = seq.next();
        let b = seq.next();
        let c = seq.next();
        assert_ne!(a, b);
        assert_ne!(b, c);
    }

    #[test]
    fn names_follow_the_artifact_pattern() {
        let name = NameSequence::new().next();
        let digits = name
            .strip_prefix(FILE_PREFIX)
            .and_then(|rest| rest.strip_suffix(FILE_EXT))
            .expect("prefix and extension");
        assert!(!digits.is_empty());
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }
}
