//! Thumbnail image fetcher over plain HTTP.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::clients::{env_retries, env_timeout, with_retry, ThumbnailFetcher};
use crate::error::{TrainerError, TrainerResult};

/// Configuration for the thumbnail fetcher.
#[derive(Debug, Clone)]
pub struct ThumbnailConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// Max retries.
    pub max_retries: u32,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            max_retries: 2,
        }
    }
}

impl ThumbnailConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            timeout: env_timeout("THUMBNAIL_TIMEOUT_SECS", 20),
            max_retries: env_retries("THUMBNAIL_RETRIES", 2),
        }
    }
}

/// Fetcher downloading thumbnail bytes from their public CDN URLs.
pub struct HttpThumbnailFetcher {
    http: Client,
    config: ThumbnailConfig,
}

impl HttpThumbnailFetcher {
    /// Create a new fetcher.
    pub fn new(config: ThumbnailConfig) -> TrainerResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TrainerError::thumbnail_failed(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> TrainerResult<Self> {
        Self::new(ThumbnailConfig::from_env())
    }
}

impl ThumbnailFetcher for HttpThumbnailFetcher {
    async fn fetch(&self, url: &str) -> TrainerResult<Vec<u8>> {
        debug!(url = %url, "Fetching thumbnail");

        let response = with_retry(self.config.max_retries, || async {
            self.http
                .get(url)
                .send()
                .await
                .map_err(|e| TrainerError::thumbnail_failed(e.to_string()))
        })
        .await?;

        if !response.status().is_success() {
            return Err(TrainerError::thumbnail_failed(format!(
                "thumbnail fetch returned {} for {}",
                response.status(),
                url
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TrainerError::thumbnail_failed(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}
