//! Derivation of scoring weights and thresholds from quartile statistics.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tscore_models::{
    CategoryThresholds, ColorRange, CorpusStats, ScoringModel, ScoringThresholds, ScoringWeights,
    MODEL_SCHEMA_VERSION,
};
use uuid::Uuid;

/// Floor for a raw separation weight before normalization.
const WEIGHT_FLOOR: f64 = 0.1;

/// Ceiling for a raw separation weight before normalization.
const WEIGHT_CEIL: f64 = 0.5;

/// Quartile separations are percentage-scaled over this span.
const WEIGHT_SEPARATION_SPAN: f64 = 100.0;

/// A boolean threshold trips when more than this share of the high
/// quartile carries the signal.
const BOOL_THRESHOLD_PCT: f64 = 50.0;

/// Color ranges kept in a category signature.
const CATEGORY_TOP_COLORS: usize = 3;

/// Object labels kept in a category signature.
const CATEGORY_TOP_OBJECTS: usize = 5;

/// Weights from the separation between the quartile means.
///
/// A feature that separates the quartiles strongly earns more weight.
/// Raw weights are clamped into `[WEIGHT_FLOOR, WEIGHT_CEIL]` and then
/// renormalized so the six weights sum to 1.0.
pub fn derive_weights(high: &CorpusStats, low: &CorpusStats) -> ScoringWeights {
    let weight = |h: f64, l: f64| {
        ((h - l).abs() / WEIGHT_SEPARATION_SPAN).clamp(WEIGHT_FLOOR, WEIGHT_CEIL)
    };

    let raw = ScoringWeights {
        text_presence: weight(high.text.pct_with_text, low.text.pct_with_text),
        face_presence: weight(high.faces.pct_with_faces, low.faces.pct_with_faces),
        face_coverage: weight(high.faces.avg_face_coverage, low.faces.avg_face_coverage),
        color_score: weight(high.colors.avg_color_score, low.colors.avg_color_score),
        text_entities: weight(high.text.avg_text_count, low.text.avg_text_count),
        object_count: weight(high.objects.avg_object_count, low.objects.avg_object_count),
    };

    // The floor keeps the sum strictly positive.
    let sum = raw.sum();
    ScoringWeights {
        text_presence: raw.text_presence / sum,
        face_presence: raw.face_presence / sum,
        face_coverage: raw.face_coverage / sum,
        color_score: raw.color_score / sum,
        text_entities: raw.text_entities / sum,
        object_count: raw.object_count / sum,
    }
}

/// Thresholds straight from the high-quartile statistics.
///
/// Booleans record whether most high performers carry the signal;
/// numerics are the quartile means verbatim.
pub fn derive_thresholds(stats: &CorpusStats) -> ScoringThresholds {
    ScoringThresholds {
        text_presence: stats.text.pct_with_text > BOOL_THRESHOLD_PCT,
        face_presence: stats.faces.pct_with_faces > BOOL_THRESHOLD_PCT,
        face_coverage: stats.faces.avg_face_coverage,
        color_score: stats.colors.avg_color_score,
        text_entities: stats.text.avg_text_count,
        object_count: stats.objects.avg_object_count,
    }
}

/// Category signature: its own thresholds plus its most frequent color
/// ranges and object labels.
pub fn derive_category_thresholds(name: &str, stats: &CorpusStats) -> CategoryThresholds {
    let common_colors: Vec<ColorRange> = stats
        .colors
        .common_ranges
        .iter()
        .take(CATEGORY_TOP_COLORS)
        .map(|stat| stat.range)
        .collect();
    let common_objects: Vec<String> = stats
        .objects
        .common_labels
        .iter()
        .take(CATEGORY_TOP_OBJECTS)
        .map(|stat| stat.label.clone())
        .collect();

    CategoryThresholds {
        name: name.to_string(),
        thresholds: derive_thresholds(stats),
        common_colors,
        common_objects,
    }
}

/// Assemble the full model document from the quartile statistics.
pub fn build_model(
    run_id: Uuid,
    generated_at: DateTime<Utc>,
    high: &CorpusStats,
    low: &CorpusStats,
    categories: BTreeMap<String, CategoryThresholds>,
) -> ScoringModel {
    ScoringModel {
        schema_version: MODEL_SCHEMA_VERSION,
        run_id: Some(run_id),
        generated_at,
        weights: derive_weights(high, low),
        thresholds: derive_thresholds(high),
        categories,
    }
}
