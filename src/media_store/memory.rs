/// In-memory storage adapter
use crate::{
    error::{LocalizerError, LocalizerResult},
    media_store::{StorageAdapter, WriteOutcome},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// Memory storage adapter
///
/// Every operation yields to the scheduler first so concurrent callers
/// interleave the way they would around real I/O.
#[derive(Default)]
pub struct MemoryAdapter {
    files: Mutex<HashMap<String, Vec<u8>>>,
    writes: AtomicUsize,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file without counting it as a write
    pub async fn insert(&self, path: &str, data: Vec<u8>) {
        self.files.lock().await.insert(path.to_string(), data);
    }

    /// Number of successful `create_binary` calls
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Sorted list of stored paths
    pub async fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.files.lock().await.keys().cloned().collect();
        paths.sort();
        paths
    }

    pub async fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().await.get(path).cloned()
    }
}

#[async_trait]
impl StorageAdapter for MemoryAdapter {
    async fn exists(&self, path: &str) -> LocalizerResult<bool> {
        tokio::task::yield_now().await;
        Ok(self.files.lock().await.contains_key(path))
    }

    async fn read_binary(&self, path: &str) -> LocalizerResult<Vec<u8>> {
        tokio::task::yield_now().await;
        self.files
            .lock()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| LocalizerError::Storage(format!("File not found: {}", path)))
    }

    async fn create_binary(&self, path: &str, data: &[u8]) -> LocalizerResult<WriteOutcome> {
        tokio::task::yield_now().await;
        let mut files = self.files.lock().await;
        if files.contains_key(path) {
            return Ok(WriteOutcome::AlreadyExists);
        }
        files.insert(path.to_string(), data.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(WriteOutcome::Written)
    }
}
