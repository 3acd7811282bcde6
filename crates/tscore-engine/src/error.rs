//! Error types for scoring operations.

use thiserror::Error;

/// Result type for scoring operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while scoring a thumbnail.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A required input list was wholly absent (not merely empty).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A model or findings artifact could not be read.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// An artifact was read but is not valid JSON for its schema.
    #[error("artifact corrupt: {path}: {source}")]
    ArtifactCorrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A parsed model violates its invariants, e.g. weights not summing
    /// to 1.0. Scoring refuses such a model rather than proceeding with
    /// skewed weights.
    #[error("invalid model: {0}")]
    InvalidModel(String),
}

impl EngineError {
    /// Invalid-input error naming the absent required list.
    pub fn missing_field(field: &str) -> Self {
        Self::InvalidInput(format!("required list `{field}` is absent"))
    }

    /// Create a model-unavailable error.
    pub fn model_unavailable(message: impl Into<String>) -> Self {
        Self::ModelUnavailable(message.into())
    }
}
