//! Thumbnail score output.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Component and overall scores for one thumbnail, each an integer 0-100.
///
/// Computed fresh on every analysis request and never mutated afterwards.
/// The face explanation names the branches the face scorer took so
/// downstream consumers can surface "why" text without re-deriving it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScoreResult {
    /// Text component score.
    pub text: u8,

    /// Visual component score (color variety, contrast, saturation).
    pub visual: u8,

    /// Face component score.
    pub faces: u8,

    /// Composition component score.
    pub composition: u8,

    /// Weighted overall score.
    pub overall: u8,

    /// Human-readable explanation of the face score.
    pub face_explanation: String,
}
