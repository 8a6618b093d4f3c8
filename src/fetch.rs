/// Remote image download
use crate::{
    config::FetchConfig,
    error::{LocalizerError, LocalizerResult},
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Downloads the bytes behind a link
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the complete body, or fail
    async fn fetch(&self, link: &str) -> LocalizerResult<Vec<u8>>;
}

/// reqwest-backed fetcher
#[derive(Clone)]
pub struct HttpFetcher {
    http_client: reqwest::Client,
    max_size: usize,
}

impl HttpFetcher {
    /// Create a new fetcher
    pub fn new(config: &FetchConfig) -> LocalizerResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                LocalizerError::Validation(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            max_size: config.max_image_size,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, link: &str) -> LocalizerResult<Vec<u8>> {
        let mut response = self
            .http_client
            .get(link)
            .send()
            .await
            .map_err(|e| LocalizerError::fetch(link, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LocalizerError::fetch(link, format!("server returned {}", status)));
        }

        if let Some(length) = response.content_length() {
            if length > self.max_size as u64 {
                return Err(LocalizerError::fetch(
                    link,
                    format!("body of {} bytes exceeds limit of {}", length, self.max_size),
                ));
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| LocalizerError::fetch(link, e))?
        {
            if body.len() + chunk.len() > self.max_size {
                return Err(LocalizerError::fetch(
                    link,
                    format!("body exceeds limit of {} bytes", self.max_size),
                ));
            }
            body.extend_from_slice(&chunk);
        }

        debug!("Fetched {} bytes from {}", body.len(), link);
        Ok(body)
    }
}
