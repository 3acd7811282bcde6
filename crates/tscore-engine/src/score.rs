//! Scoring entry point combining the four component scorers.

use tscore_models::{Findings, ScoreResult, ScoringModel, VisionFeatures};

use crate::composition::score_composition;
use crate::error::{EngineError, EngineResult};
use crate::face::score_faces;
use crate::text::score_text;
use crate::visual::score_visual;
use crate::weighted::{clamp_round, weighted_average};

/// Fixed weight of the composition component in the overall combination.
const COMPOSITION_OVERALL_WEIGHT: f64 = 0.3;

/// Score one thumbnail's vision features against a model/findings pair.
///
/// Pure and deterministic: identical inputs always produce identical
/// output and no state is read or written, so arbitrarily many concurrent
/// callers can share one snapshot.
///
/// Fails fast with [`EngineError::InvalidInput`] when `detected_text`,
/// `dominant_colors`, or `faces` is wholly absent; empty lists and all
/// other missing signals degrade to documented defaults instead.
pub fn score(
    features: &VisionFeatures,
    model: &ScoringModel,
    findings: &Findings,
) -> EngineResult<ScoreResult> {
    validate_features(features)?;
    model.validate().map_err(EngineError::InvalidModel)?;

    let face = score_faces(features, model, findings);

    let text = clamp_round(score_text(features, model, findings));
    let visual = clamp_round(score_visual(features, findings));
    let faces = clamp_round(face.score);

    // Composition and overall combine the already-rounded components so the
    // persisted component scores always explain the combined ones.
    let composition = clamp_round(score_composition(
        features,
        text as f64,
        visual as f64,
        faces as f64,
    ));

    let weights = &model.weights;
    let text_weight = (weights.text_presence + weights.text_entities) / 2.0;
    let face_weight = (weights.face_presence + weights.face_coverage) / 2.0;
    let overall = clamp_round(weighted_average(&[
        (text as f64, text_weight),
        (visual as f64, weights.color_score),
        (faces as f64, face_weight),
        (composition as f64, COMPOSITION_OVERALL_WEIGHT),
    ]));

    Ok(ScoreResult {
        text,
        visual,
        faces,
        composition,
        overall,
        face_explanation: face.explanation,
    })
}

fn validate_features(features: &VisionFeatures) -> EngineResult<()> {
    if features.detected_text.is_none() {
        return Err(EngineError::missing_field("detected_text"));
    }
    if features.dominant_colors.is_none() {
        return Err(EngineError::missing_field("dominant_colors"));
    }
    if features.faces.is_none() {
        return Err(EngineError::missing_field("faces"));
    }
    Ok(())
}
