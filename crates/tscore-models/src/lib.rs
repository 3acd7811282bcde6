//! Shared data models for the ThumbScore backend.
//!
//! This crate provides Serde-serializable types for:
//! - Thumbnail vision features (text, colors, faces)
//! - The persisted scoring model (weights + thresholds)
//! - The persisted findings document (corpus statistics)
//! - Score results
//! - Sampled video metadata consumed by the trainer

pub mod color;
pub mod findings;
pub mod model;
pub mod score;
pub mod video;
pub mod vision;

// Re-export common types
pub use color::{ColorParseError, ColorRange, ColorResult};
pub use findings::{
    ColorFindings, ColorRangeStat, CorpusStats, FaceFindings, Findings, ObjectFindings,
    ObjectStat, TextFindings, FINDINGS_SCHEMA_VERSION,
};
pub use model::{
    CategoryThresholds, ScoringModel, ScoringThresholds, ScoringWeights, MODEL_SCHEMA_VERSION,
    WEIGHT_SUM_TOLERANCE,
};
pub use score::ScoreResult;
pub use video::{SampledVideo, VideoCategory};
pub use vision::{
    BoundingPoly, ContrastLevel, DominantColor, Expression, FaceDetection, FacePosition,
    FaceProminence, FontMetrics, PolyPoint, TextReadability, ThumbnailLayout, VisionFeatures,
    REFERENCE_HEIGHT, REFERENCE_WIDTH,
};
