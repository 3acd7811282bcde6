//! External collaborators the trainer samples from.
//!
//! All three collaborators sit behind traits so the pipeline can be driven
//! by scripted implementations in tests. The provided implementations are
//! thin reqwest clients with shared retry behavior.

use std::future::Future;
use std::time::Duration;

use tracing::warn;
use tscore_models::{BoundingPoly, DominantColor, Expression, SampledVideo};

use crate::error::TrainerResult;

mod thumbnail;
mod vision;
mod youtube;

pub use thumbnail::{HttpThumbnailFetcher, ThumbnailConfig};
pub use vision::{HttpVisionClient, VisionConfig};
pub use youtube::{CatalogConfig, YouTubeCatalog};

/// One page of popularity-ranked videos.
#[derive(Debug, Clone)]
pub struct VideoPage {
    pub videos: Vec<SampledVideo>,
    pub next_page_token: Option<String>,
}

/// Raw face annotation before assembly into a `FaceDetection`.
#[derive(Debug, Clone)]
pub struct RawFaceSignal {
    pub bounding: BoundingPoly,
    pub confidence: f64,
    pub expressions: Vec<Expression>,
}

/// Raw vision annotations for one thumbnail image.
#[derive(Debug, Clone, Default)]
pub struct RawVisionSignals {
    /// Distinct text fragments in detection order.
    pub text_fragments: Vec<String>,
    /// Detected faces.
    pub faces: Vec<RawFaceSignal>,
    /// Dominant colors, most dominant first.
    pub colors: Vec<DominantColor>,
    /// Localized object labels in detection order.
    pub object_labels: Vec<String>,
}

/// Lists popular videos for a category, one page at a time.
pub trait VideoCatalog: Send + Sync {
    fn list_popular(
        &self,
        category_id: &str,
        max_results: u32,
        page_token: Option<&str>,
    ) -> impl Future<Output = TrainerResult<VideoPage>> + Send;
}

/// Downloads thumbnail image bytes.
pub trait ThumbnailFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = TrainerResult<Vec<u8>>> + Send;
}

/// Runs vision detection over one thumbnail image.
pub trait VisionAnalyzer: Send + Sync {
    fn analyze(&self, image: &[u8]) -> impl Future<Output = TrainerResult<RawVisionSignals>> + Send;
}

/// Execute with retry logic.
///
/// Retries only errors classified retryable, with a doubling delay starting
/// at 500ms.
pub(crate) async fn with_retry<F, Fut, T>(max_retries: u32, operation: F) -> TrainerResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = TrainerResult<T>>,
{
    let mut last_error = None;

    for attempt in 0..=max_retries {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_retryable() && attempt < max_retries => {
                let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                warn!(
                    "Request failed (attempt {}), retrying in {:?}: {}",
                    attempt + 1,
                    delay,
                    e
                );
                tokio::time::sleep(delay).await;
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_error
        .unwrap_or_else(|| crate::error::TrainerError::catalog_failed("unknown error")))
}

/// Read a timeout in whole seconds from the environment.
pub(crate) fn env_timeout(var: &str, default_secs: u64) -> Duration {
    Duration::from_secs(
        std::env::var(var)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(default_secs),
    )
}

/// Read a retry count from the environment.
pub(crate) fn env_retries(var: &str, default: u32) -> u32 {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
