//! Face component scorer and its explanation builder.
//!
//! Besides the score this module produces the required human-readable
//! explanation, one clause per branch taken, so downstream consumers can
//! show "why" without re-deriving the scoring path.

use tscore_models::{
    Expression, FaceDetection, FacePosition, FaceProminence, Findings, ScoringModel,
    VisionFeatures,
};

use crate::weighted::weighted_average;

/// Whether content is assumed to require faces when none are detected.
///
/// Hard-coded on even though per-category data exists in the model;
/// preserved as-is rather than inferred per category.
const CATEGORY_REQUIRES_FACES: bool = true;

/// Fixed weights in the face combination; the presence and prominence
/// weights come from the scoring model.
const COUNT_WEIGHT: f64 = 0.15;
const EXPRESSION_WEIGHT: f64 = 0.25;
const POSITION_WEIGHT: f64 = 0.15;

/// Score when faces are absent but the content does not require them.
const NO_FACE_NEUTRAL_SCORE: f64 = 70.0;

/// Subscore when faces carry no expression labels or no measurable
/// prominence.
const NEUTRAL_SUBSCORE: f64 = 50.0;

/// Mean detection confidence below which the explanation carries a caveat.
const LOW_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// A face score plus its explanation.
pub(crate) struct FaceScore {
    pub score: f64,
    pub explanation: String,
}

/// Score the face component (0-100, unrounded).
pub(crate) fn score_faces(
    features: &VisionFeatures,
    model: &ScoringModel,
    findings: &Findings,
) -> FaceScore {
    score_with_requirement(features, model, findings, CATEGORY_REQUIRES_FACES)
}

fn score_with_requirement(
    features: &VisionFeatures,
    model: &ScoringModel,
    findings: &Findings,
    requires_faces: bool,
) -> FaceScore {
    let faces = features.faces.as_deref().unwrap_or_default();

    if faces.is_empty() {
        if requires_faces {
            return FaceScore {
                score: 0.0,
                explanation: "No faces detected; this content performs best with a visible face"
                    .to_string(),
            };
        }
        return FaceScore {
            score: NO_FACE_NEUTRAL_SCORE,
            explanation: "No faces detected; acceptable for this content".to_string(),
        };
    }

    let count = count_score(faces.len(), findings.overall.faces.avg_face_count);
    let prominence = FaceProminence::from_total_coverage(features.total_face_coverage());
    let expression = expression_score(faces);
    let position = position_score(features.eye_contact, features.face_position);

    let score = weighted_average(&[
        (100.0, model.weights.face_presence),
        (count, COUNT_WEIGHT),
        (prominence_score(prominence), model.weights.face_coverage),
        (expression, EXPRESSION_WEIGHT),
        (position, POSITION_WEIGHT),
    ]);

    FaceScore {
        score,
        explanation: build_explanation(faces, prominence, expression),
    }
}

/// Face count against the corpus average.
fn count_score(count: usize, corpus_avg: f64) -> f64 {
    let count = count as f64;
    if corpus_avg <= 2.0 {
        // Corpora of one or two faces reward having faces at all
        (90.0 + (count / 2.0) * 10.0).min(100.0)
    } else if count <= 2.0 {
        100.0
    } else {
        (100.0 - 15.0 * (count - 2.0)).max(40.0)
    }
}

fn prominence_score(prominence: Option<FaceProminence>) -> f64 {
    match prominence {
        Some(FaceProminence::High) => 100.0,
        Some(FaceProminence::Medium) => 80.0,
        Some(FaceProminence::Low) => 60.0,
        None => NEUTRAL_SUBSCORE,
    }
}

/// Emotional-impact weight of one expression label.
fn expression_weight(expression: Expression) -> f64 {
    match expression {
        Expression::Joy => 1.0,
        Expression::Excited => 0.95,
        Expression::Surprise => 0.95,
        Expression::Happy => 0.9,
        Expression::Confused => 0.7,
        Expression::Angry => 0.6,
        Expression::Neutral => 0.5,
        Expression::Sad => 0.4,
        Expression::Unknown => 0.5,
    }
}

/// Mean emotional impact across every expression of every face.
fn expression_score(faces: &[FaceDetection]) -> f64 {
    let weights: Vec<f64> = faces
        .iter()
        .flat_map(|face| face.expressions.iter())
        .map(|&expression| expression_weight(expression))
        .collect();
    if weights.is_empty() {
        return NEUTRAL_SUBSCORE;
    }
    weights.iter().map(|w| w * 100.0).sum::<f64>() / weights.len() as f64
}

fn position_score(eye_contact: Option<bool>, position: Option<FacePosition>) -> f64 {
    let mut score = 75.0;
    match eye_contact {
        Some(true) => score += 15.0,
        Some(false) => score -= 10.0,
        None => {}
    }
    match position {
        Some(FacePosition::Center) => score += 10.0,
        Some(FacePosition::Left) | Some(FacePosition::Right) => score += 5.0,
        None => {}
    }
    score
}

fn build_explanation(
    faces: &[FaceDetection],
    prominence: Option<FaceProminence>,
    expression: f64,
) -> String {
    let mut clauses: Vec<String> = Vec::new();

    let count = faces.len();
    if count == 1 {
        clauses.push("1 face detected".to_string());
    } else if count <= 3 {
        clauses.push(format!("{count} faces detected"));
    } else {
        clauses.push(format!("{count} faces detected, which can crowd the frame"));
    }

    match prominence {
        Some(FaceProminence::High) => clauses.push("strong face prominence".to_string()),
        Some(FaceProminence::Medium) => clauses.push("moderate face prominence".to_string()),
        Some(FaceProminence::Low) => {
            clauses.push("faces occupy little of the frame".to_string())
        }
        None => clauses.push("face prominence could not be measured".to_string()),
    }

    if faces.iter().any(|face| !face.expressions.is_empty()) {
        if expression >= 80.0 {
            clauses.push("expressions skew strongly positive".to_string());
        } else if expression >= 55.0 {
            clauses.push("expressions are mildly positive".to_string());
        } else {
            clauses.push("expressions read flat or negative".to_string());
        }
    }

    let avg_confidence =
        faces.iter().map(|face| face.confidence).sum::<f64>() / count as f64;
    if avg_confidence < LOW_CONFIDENCE_THRESHOLD {
        clauses.push("detection confidence is low".to_string());
    }

    clauses.join("; ")
}
