//! Text component scorer.
//!
//! Rates presence, fragment count against the corpus optimum, readability,
//! and font metrics, combined with the partial-weighted-average pattern.

use tscore_models::{Findings, FontMetrics, ScoringModel, TextReadability, VisionFeatures};

use crate::weighted::{normalize_around_average, weighted_average};

/// Fixed weight of the readability subscore in the text combination.
const READABILITY_WEIGHT: f64 = 0.3;

/// Fixed weight of the font subscore in the text combination.
const FONT_WEIGHT: f64 = 0.2;

/// Subscore used when the corresponding signal was not measured.
const DEFAULT_READABILITY_SCORE: f64 = 80.0;
const DEFAULT_FONT_SCORE: f64 = 80.0;

/// Reference mean glyph height in pixels of the 1280x720 frame.
const REFERENCE_FONT_HEIGHT_PX: f64 = 48.0;

/// Text/background contrast ratio treated as fully readable.
const FONT_CONTRAST_TARGET: f64 = 4.5;

/// Maximum bonus for glyph heights above the reference.
const FONT_SIZE_MAX_BONUS: f64 = 30.0;

/// Score the text component (0-100, unrounded).
pub(crate) fn score_text(
    features: &VisionFeatures,
    model: &ScoringModel,
    findings: &Findings,
) -> f64 {
    let fragments = features.detected_text.as_deref().unwrap_or_default();
    let stats = &findings.overall.text;

    let presence = if fragments.is_empty() { 0.0 } else { 100.0 };
    let entities = entities_score(fragments.len(), stats.avg_text_count);
    let readability = readability_score(
        features.text_readability,
        features.total_text_chars(),
        stats.avg_char_count.max(1.0),
    );
    let font = font_score(features.font.as_ref());

    weighted_average(&[
        (presence, model.weights.text_presence),
        (entities, model.weights.text_entities),
        (readability, READABILITY_WEIGHT),
        (font, FONT_WEIGHT),
    ])
}

/// Fragment count against the corpus optimum.
///
/// Within half to one-and-a-half times the optimum the score rewards
/// closeness; outside that band it degrades linearly from 70 toward a
/// floor of 30.
fn entities_score(count: usize, optimal: f64) -> f64 {
    let count = count as f64;
    if optimal <= 0.0 {
        return if count == 0.0 { 100.0 } else { 70.0 };
    }
    let upper = 1.5 * optimal;
    let lower = 0.5 * optimal;
    if count > upper {
        let excess = (count - upper) / upper;
        (70.0 * (1.0 - excess)).max(30.0)
    } else if count < lower {
        let deficit = (lower - count) / lower;
        (70.0 * (1.0 - deficit)).max(30.0)
    } else {
        100.0 - 30.0 * ((count - optimal).abs() / optimal)
    }
}

fn readability_score(label: TextReadability, chars: usize, optimal_chars: f64) -> f64 {
    match label {
        TextReadability::Good => 100.0,
        TextReadability::Excessive => {
            let excess = (chars as f64 - optimal_chars) / optimal_chars;
            (60.0 - 30.0 * excess).clamp(30.0, 60.0)
        }
        TextReadability::Minimal => {
            let deficit = (optimal_chars - chars as f64) / optimal_chars;
            (70.0 - 30.0 * deficit).clamp(40.0, 70.0)
        }
        TextReadability::None => DEFAULT_READABILITY_SCORE,
    }
}

/// Blend of glyph-height closeness to the reference and the text/background
/// contrast ratio; the contrast half drops out when unmeasured.
fn font_score(font: Option<&FontMetrics>) -> f64 {
    let Some(font) = font else {
        return DEFAULT_FONT_SCORE;
    };
    let size_part = normalize_around_average(
        font.avg_height_px,
        REFERENCE_FONT_HEIGHT_PX,
        FONT_SIZE_MAX_BONUS,
    );
    match font.contrast_ratio {
        Some(ratio) => {
            let contrast_part = if ratio >= FONT_CONTRAST_TARGET {
                100.0
            } else {
                (ratio / FONT_CONTRAST_TARGET * 100.0).max(0.0)
            };
            (size_part + contrast_part) / 2.0
        }
        None => size_part,
    }
}
