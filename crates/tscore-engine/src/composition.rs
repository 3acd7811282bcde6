//! Composition component scorer.
//!
//! Combines the other three component scores with a balance measure,
//! layout classification, and clutter estimate.

use tscore_models::{ThumbnailLayout, VisionFeatures};

/// Weights of the three components inside the balance measure.
const BALANCE_TEXT_WEIGHT: f64 = 0.3;
const BALANCE_VISUAL_WEIGHT: f64 = 0.4;
const BALANCE_FACE_WEIGHT: f64 = 0.3;

/// Dampening applied to the balance standard deviation.
const BALANCE_SPREAD_FACTOR: f64 = 0.8;

/// Final combination weights. They intentionally sum to 1.35 and the
/// result divides by [`COMPOSITION_WEIGHT_TOTAL`] rather than
/// renormalizing them to 1.0.
const TEXT_WEIGHT: f64 = 0.25;
const VISUAL_WEIGHT: f64 = 0.30;
const FACE_WEIGHT: f64 = 0.25;
const BALANCE_WEIGHT: f64 = 0.25;
const LAYOUT_WEIGHT: f64 = 0.15;
const CLUTTER_WEIGHT: f64 = 0.15;
const COMPOSITION_WEIGHT_TOTAL: f64 = 1.35;

/// Subscores when the structural signal was not measured.
const DEFAULT_LAYOUT_SCORE: f64 = 70.0;
const DEFAULT_CLUTTER_SCORE: f64 = 80.0;

/// Score the composition component (0-100, unrounded) from the rounded
/// text, visual, and face components.
pub(crate) fn score_composition(
    features: &VisionFeatures,
    text: f64,
    visual: f64,
    faces: f64,
) -> f64 {
    let balance = balance_score(text, visual, faces);
    let layout = layout_score(features.layout);
    let clutter = clutter_score(features.clutter_factor);

    (TEXT_WEIGHT * text
        + VISUAL_WEIGHT * visual
        + FACE_WEIGHT * faces
        + BALANCE_WEIGHT * balance
        + LAYOUT_WEIGHT * layout
        + CLUTTER_WEIGHT * clutter)
        / COMPOSITION_WEIGHT_TOTAL
}

/// How evenly the three component scores sit around their weighted mean.
///
/// The weighted standard deviation is dampened and subtracted from 100, so
/// a thumbnail strong in one dimension but weak in another reads as
/// unbalanced.
fn balance_score(text: f64, visual: f64, faces: f64) -> f64 {
    let mean = BALANCE_TEXT_WEIGHT * text + BALANCE_VISUAL_WEIGHT * visual + BALANCE_FACE_WEIGHT * faces;
    let variance = BALANCE_TEXT_WEIGHT * (text - mean).powi(2)
        + BALANCE_VISUAL_WEIGHT * (visual - mean).powi(2)
        + BALANCE_FACE_WEIGHT * (faces - mean).powi(2);
    (100.0 - variance.sqrt() * BALANCE_SPREAD_FACTOR).max(0.0)
}

fn layout_score(layout: Option<ThumbnailLayout>) -> f64 {
    match layout {
        Some(ThumbnailLayout::RuleOfThirds) => 100.0,
        Some(ThumbnailLayout::GoldenRatio) => 95.0,
        Some(ThumbnailLayout::Centered) => 85.0,
        Some(ThumbnailLayout::Other) => 75.0,
        None => DEFAULT_LAYOUT_SCORE,
    }
}

fn clutter_score(clutter: Option<f64>) -> f64 {
    match clutter {
        Some(factor) => (100.0 - factor * 100.0).max(0.0),
        None => DEFAULT_CLUTTER_SCORE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_equal_components_is_perfect() {
        assert_eq!(balance_score(80.0, 80.0, 80.0), 100.0);
    }

    #[test]
    fn test_balance_penalizes_spread() {
        let even = balance_score(70.0, 75.0, 72.0);
        let lopsided = balance_score(100.0, 90.0, 0.0);
        assert!(even > lopsided, "even {even} should beat lopsided {lopsided}");
        assert!(lopsided >= 0.0);
    }

    #[test]
    fn test_layout_preferences() {
        assert_eq!(layout_score(Some(ThumbnailLayout::RuleOfThirds)), 100.0);
        assert_eq!(layout_score(Some(ThumbnailLayout::GoldenRatio)), 95.0);
        assert_eq!(layout_score(Some(ThumbnailLayout::Centered)), 85.0);
        assert_eq!(layout_score(Some(ThumbnailLayout::Other)), 75.0);
        assert_eq!(layout_score(None), 70.0);
    }

    #[test]
    fn test_clutter_score() {
        assert_eq!(clutter_score(None), 80.0);
        assert_eq!(clutter_score(Some(0.0)), 100.0);
        assert_eq!(clutter_score(Some(0.35)), 65.0);
        assert_eq!(clutter_score(Some(1.0)), 0.0);
    }

    #[test]
    fn test_composition_normalizer() {
        // With every input pinned to 100 the 1.35 divisor yields exactly 100
        let features = VisionFeatures {
            layout: Some(ThumbnailLayout::RuleOfThirds),
            clutter_factor: Some(0.0),
            ..VisionFeatures::empty()
        };
        let score = score_composition(&features, 100.0, 100.0, 100.0);
        assert!((score - 100.0).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn test_composition_unknown_structural_signals() {
        // Defaults keep composition mid-range for uniform components
        let features = VisionFeatures::empty();
        let score = score_composition(&features, 80.0, 80.0, 80.0);
        // (0.8*80 + 0.25*100 + 0.15*70 + 0.15*80) / 1.35
        let expected = (0.25 * 80.0 + 0.30 * 80.0 + 0.25 * 80.0 + 0.25 * 100.0
            + 0.15 * 70.0
            + 0.15 * 80.0)
            / 1.35;
        assert!((score - expected).abs() < 1e-9);
    }
}
