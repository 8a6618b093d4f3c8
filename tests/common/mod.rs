//! Shared fixtures for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use image_localizer::{
    config::MediaConfig, Fetcher, IngestionPipeline, LocalizerError, LocalizerResult,
    StorageAdapter,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Bytes that sniff as PNG, distinct per `tag`
pub fn png(tag: &str) -> Vec<u8> {
    let mut data = PNG_SIGNATURE.to_vec();
    data.extend_from_slice(&[0, 0, 0, 13]);
    data.extend_from_slice(tag.as_bytes());
    data
}

/// Fetcher serving canned bodies; unknown links fail like a 404
#[derive(Default)]
pub struct StubFetcher {
    bodies: Mutex<HashMap<String, Vec<u8>>>,
    calls: AtomicUsize,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(self, link: &str, body: Vec<u8>) -> Self {
        self.set(link, body);
        self
    }

    pub fn set(&self, link: &str, body: Vec<u8>) {
        self.bodies.lock().unwrap().insert(link.to_string(), body);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, link: &str) -> LocalizerResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.bodies
            .lock()
            .unwrap()
            .get(link)
            .cloned()
            .ok_or_else(|| LocalizerError::fetch(link, "server returned 404 Not Found"))
    }
}

/// Storage adapter whose every operation fails
pub struct BrokenAdapter;

#[async_trait]
impl StorageAdapter for BrokenAdapter {
    async fn exists(&self, path: &str) -> LocalizerResult<bool> {
        Err(LocalizerError::Storage(format!("disk unavailable: {}", path)))
    }

    async fn read_binary(&self, path: &str) -> LocalizerResult<Vec<u8>> {
        Err(LocalizerError::Storage(format!("disk unavailable: {}", path)))
    }

    async fn create_binary(
        &self,
        path: &str,
        _data: &[u8],
    ) -> LocalizerResult<image_localizer::WriteOutcome> {
        Err(LocalizerError::Storage(format!("disk unavailable: {}", path)))
    }
}

pub fn pipeline(
    adapter: Arc<dyn StorageAdapter>,
    fetcher: Arc<dyn Fetcher>,
) -> IngestionPipeline {
    IngestionPipeline::new(MediaConfig::default(), adapter, fetcher)
}

/// Suffix part of `media/<base>-<suffix>.<ext>`, if the path has that shape
pub fn suffix_of<'a>(path: &'a str, base: &str, ext: &str) -> Option<&'a str> {
    path.strip_prefix("media/")?
        .strip_prefix(base)?
        .strip_prefix('-')?
        .strip_suffix(ext)?
        .strip_suffix('.')
}
