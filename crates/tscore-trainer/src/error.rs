//! Trainer error types.

use thiserror::Error;

pub type TrainerResult<T> = Result<T, TrainerError>;

#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("Catalog request failed: {0}")]
    CatalogFailed(String),

    #[error("Thumbnail download failed: {0}")]
    ThumbnailFailed(String),

    #[error("Vision analysis failed: {0}")]
    VisionFailed(String),

    #[error("No usable samples: {0}")]
    NoUsableSamples(String),

    #[error("Artifact write failed: {0}")]
    ArtifactWrite(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Engine error: {0}")]
    Engine(#[from] tscore_engine::EngineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TrainerError {
    pub fn catalog_failed(msg: impl Into<String>) -> Self {
        Self::CatalogFailed(msg.into())
    }

    pub fn thumbnail_failed(msg: impl Into<String>) -> Self {
        Self::ThumbnailFailed(msg.into())
    }

    pub fn vision_failed(msg: impl Into<String>) -> Self {
        Self::VisionFailed(msg.into())
    }

    pub fn no_usable_samples(msg: impl Into<String>) -> Self {
        Self::NoUsableSamples(msg.into())
    }

    pub fn artifact_write(msg: impl Into<String>) -> Self {
        Self::ArtifactWrite(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if error is retryable.
    ///
    /// Network-facing failures are worth another attempt; everything else
    /// (bad configuration, corrupted artifacts, empty corpora) is not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TrainerError::CatalogFailed(_)
                | TrainerError::ThumbnailFailed(_)
                | TrainerError::VisionFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(TrainerError::catalog_failed("timeout").is_retryable());
        assert!(TrainerError::thumbnail_failed("connection reset").is_retryable());
        assert!(TrainerError::vision_failed("503").is_retryable());
        assert!(!TrainerError::config("missing key").is_retryable());
        assert!(!TrainerError::no_usable_samples("empty corpus").is_retryable());
        assert!(!TrainerError::artifact_write("disk full").is_retryable());
    }
}
