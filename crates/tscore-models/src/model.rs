//! Persisted scoring model: feature weights and thresholds derived from
//! corpus analysis.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::color::ColorRange;

/// Schema version written into new model artifacts.
pub const MODEL_SCHEMA_VERSION: u32 = 1;

/// Tolerance for validating that the six weights sum to 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Feature weights used to combine component scores.
///
/// Derived by the trainer from the separation between high- and
/// low-engagement quartiles; always renormalized so the six weights sum
/// to 1.0 within [`WEIGHT_SUM_TOLERANCE`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScoringWeights {
    pub text_presence: f64,
    pub face_presence: f64,
    pub face_coverage: f64,
    pub color_score: f64,
    pub text_entities: f64,
    pub object_count: f64,
}

impl ScoringWeights {
    /// Sum of all six weights.
    pub fn sum(&self) -> f64 {
        self.text_presence
            + self.face_presence
            + self.face_coverage
            + self.color_score
            + self.text_entities
            + self.object_count
    }

    /// Check the sum-to-1.0 invariant.
    pub fn validate(&self) -> Result<(), String> {
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(format!("scoring weights sum to {sum}, expected 1.0"));
        }
        Ok(())
    }
}

impl Default for ScoringWeights {
    /// The hard-coded fallback weights used when no trained model exists.
    fn default() -> Self {
        Self {
            text_presence: 0.2,
            face_presence: 0.2,
            face_coverage: 0.15,
            color_score: 0.25,
            text_entities: 0.1,
            object_count: 0.1,
        }
    }
}

/// Feature cutoffs derived from the high-engagement quartile.
///
/// Booleans record whether more than half of the high performers carry the
/// signal; numerics are the high-quartile means verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScoringThresholds {
    /// Whether most high performers carry text.
    pub text_presence: bool,

    /// Whether most high performers show a face.
    pub face_presence: bool,

    /// Mean face coverage among high performers (percent of image area).
    pub face_coverage: f64,

    /// Mean derived color score among high performers.
    pub color_score: f64,

    /// Mean text-fragment count among high performers.
    pub text_entities: f64,

    /// Mean detected-object count among high performers.
    pub object_count: f64,
}

impl Default for ScoringThresholds {
    fn default() -> Self {
        Self {
            text_presence: true,
            face_presence: true,
            face_coverage: 15.0,
            color_score: 70.0,
            text_entities: 2.0,
            object_count: 3.0,
        }
    }
}

/// Per-category thresholds plus that category's signature colors and objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CategoryThresholds {
    /// Category display name.
    pub name: String,

    /// Threshold set derived from this category's own samples.
    pub thresholds: ScoringThresholds,

    /// Most frequent color ranges (top 3).
    #[serde(default)]
    pub common_colors: Vec<ColorRange>,

    /// Most frequent object labels (top 5).
    #[serde(default)]
    pub common_objects: Vec<String>,
}

/// Persisted scoring model, read-only at scoring time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScoringModel {
    /// Artifact schema version.
    pub schema_version: u32,

    /// Training run that produced this model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<Uuid>,

    /// When the model was generated.
    pub generated_at: DateTime<Utc>,

    /// Component weights, summing to 1.0.
    pub weights: ScoringWeights,

    /// Global thresholds from the high-engagement quartile.
    pub thresholds: ScoringThresholds,

    /// Per-category thresholds keyed by category id.
    #[serde(default)]
    pub categories: BTreeMap<String, CategoryThresholds>,
}

impl ScoringModel {
    /// The hard-coded fallback model used when training yields no usable
    /// thumbnails or no trained artifact exists.
    pub fn fallback() -> Self {
        Self {
            schema_version: MODEL_SCHEMA_VERSION,
            run_id: None,
            generated_at: Utc::now(),
            weights: ScoringWeights::default(),
            thresholds: ScoringThresholds::default(),
            categories: BTreeMap::new(),
        }
    }

    /// Validate invariants that must hold before the model is used for
    /// scoring.
    pub fn validate(&self) -> Result<(), String> {
        self.weights.validate()
    }

    /// Parse a model from its JSON artifact text.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Serialize to the pretty-printed artifact form.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_weights_sum_to_one() {
        let model = ScoringModel::fallback();
        assert!(model.validate().is_ok());
        assert!((model.weights.sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
    }

    #[test]
    fn test_fallback_weight_values() {
        let weights = ScoringWeights::default();
        assert_eq!(weights.text_presence, 0.2);
        assert_eq!(weights.face_presence, 0.2);
        assert_eq!(weights.face_coverage, 0.15);
        assert_eq!(weights.color_score, 0.25);
        assert_eq!(weights.text_entities, 0.1);
        assert_eq!(weights.object_count, 0.1);
    }

    #[test]
    fn test_validate_rejects_bad_sum() {
        let weights = ScoringWeights {
            text_presence: 0.5,
            face_presence: 0.5,
            face_coverage: 0.5,
            color_score: 0.0,
            text_entities: 0.0,
            object_count: 0.0,
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn test_model_json_round_trip() {
        let mut model = ScoringModel::fallback();
        model.run_id = Some(Uuid::new_v4());
        model.categories.insert(
            "20".to_string(),
            CategoryThresholds {
                name: "Gaming".to_string(),
                thresholds: ScoringThresholds::default(),
                common_colors: vec![ColorRange::Red, ColorRange::Black],
                common_objects: vec!["person".to_string(), "screen".to_string()],
            },
        );

        let json = model.to_json_pretty().unwrap();
        let back = ScoringModel::from_json(&json).unwrap();
        assert_eq!(back, model);
        assert_eq!(back.schema_version, MODEL_SCHEMA_VERSION);
    }
}
