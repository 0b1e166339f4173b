use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;

use super::{AudioArtifact, AudioStore, AudioStream, NameSequence, StoreError};

/// In-memory stand-in for the filesystem store, used by handler tests.
pub struct MemAudioStore {
    files: Mutex<HashMap<String, (Bytes, Instant)>>,
    names: NameSequence,
}

impl MemAudioStore {
    pub fn new() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            names: NameSequence::new(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.lock().unwrap().contains_key(name)
    }
}

impl Default for MemAudioStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioStore for MemAudioStore {
    async fn write(&self, bytes: Bytes) -> Result<AudioArtifact, StoreError> {
        let file_name = self.names.next();
        self.files
            .lock()
            .unwrap()
            .insert(file_name.clone(), (bytes, Instant::now()));

        Ok(AudioArtifact {
            url_path: format!("/audio/{file_name}"),
            file_name,
        })
    }

    async fn open(&self, name: &str) -> Result<AudioStream, StoreError> {
        let files = self.files.lock().unwrap();
        let (bytes, _) = files
            .get(name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;

        Ok(AudioStream {
            len: bytes.len() as u64,
            reader: Box::new(Cursor::new(bytes.to_vec())),
        })
    }

    async fn purge(&self, max_age: Duration) -> Result<usize, StoreError> {
        let mut files = self.files.lock().unwrap();
        let before = files.len();
        files.retain(|_, (_, created)| created.elapsed() <= max_age);
        Ok(before - files.len())
    }
}
