//! Visual component scorer.
//!
//! Rates color variety, contrast, corpus color match, and saturation. The
//! combination weights are fixed and sum to 1.0; saturation falls back to a
//! neutral default when unmeasured, so all four terms always apply.

use tscore_models::{ColorRange, ContrastLevel, DominantColor, Findings, VisionFeatures};

use crate::store::common_color_ranges;
use crate::weighted::weighted_average;

/// Fixed combination weights, preserved verbatim.
const VARIETY_WEIGHT: f64 = 0.25;
const CONTRAST_WEIGHT: f64 = 0.35;
const MATCH_WEIGHT: f64 = 0.25;
const SATURATION_WEIGHT: f64 = 0.15;

/// Optimal dominant-color count.
const OPTIMAL_COLOR_COUNT: f64 = 3.0;

/// Contribution of a dominant color absent from the corpus ranges.
const UNMATCHED_COLOR_SCORE: f64 = 20.0;

/// Match score when no dominant colors were extracted at all.
const DEFAULT_MATCH_SCORE: f64 = 50.0;

/// Saturation score when the signal was not measured.
const DEFAULT_SATURATION_SCORE: f64 = 75.0;

/// Score the visual component (0-100, unrounded).
pub(crate) fn score_visual(features: &VisionFeatures, findings: &Findings) -> f64 {
    let colors = features.dominant_colors.as_deref().unwrap_or_default();

    let variety = variety_score(colors.len());
    let contrast = contrast_score(features.color_contrast, features.brightness);
    let color_match = color_match_score(colors, findings);
    let saturation = saturation_score(features.saturation);

    VARIETY_WEIGHT * variety
        + CONTRAST_WEIGHT * contrast
        + MATCH_WEIGHT * color_match
        + SATURATION_WEIGHT * saturation
}

/// Color-count score around the optimum of three.
fn variety_score(count: usize) -> f64 {
    let count = count as f64;
    if count < OPTIMAL_COLOR_COUNT {
        70.0 + 30.0 * (count / OPTIMAL_COLOR_COUNT)
    } else if count > 2.0 * OPTIMAL_COLOR_COUNT {
        (80.0 - 10.0 * (count - 2.0 * OPTIMAL_COLOR_COUNT)).max(40.0)
    } else {
        100.0 - 5.0 * (count - OPTIMAL_COLOR_COUNT).abs()
    }
}

fn contrast_score(contrast: Option<ContrastLevel>, brightness: Option<f64>) -> f64 {
    match contrast {
        Some(ContrastLevel::High) => 100.0,
        Some(ContrastLevel::Medium) => 75.0,
        Some(ContrastLevel::Low) => 50.0,
        None => {
            if brightness.is_some_and(|b| b > 0.5) {
                70.0
            } else {
                40.0
            }
        }
    }
}

/// How well the dominant colors match what the corpus favors.
///
/// Each color contributes its corpus share when its range is common, a
/// flat 20 otherwise; earlier (more dominant) colors carry descending
/// linear position weights.
fn color_match_score(colors: &[DominantColor], findings: &Findings) -> f64 {
    if colors.is_empty() {
        return DEFAULT_MATCH_SCORE;
    }
    let n = colors.len();
    let pairs: Vec<(f64, f64)> = colors
        .iter()
        .enumerate()
        .map(|(i, color)| {
            let value = match color.rgb() {
                Some((r, g, b)) => {
                    let range = ColorRange::classify(r, g, b);
                    common_color_ranges(findings)
                        .find(|stat| stat.range == range)
                        .map(|stat| stat.percentage)
                        .unwrap_or(UNMATCHED_COLOR_SCORE)
                }
                // An unparseable hex counts as unmatched
                None => UNMATCHED_COLOR_SCORE,
            };
            (value, (n - i) as f64)
        })
        .collect();
    weighted_average(&pairs)
}

/// Saturation sweet spot between 0.3 and 0.8.
fn saturation_score(saturation: Option<f64>) -> f64 {
    let Some(sat) = saturation else {
        return DEFAULT_SATURATION_SCORE;
    };
    let sat = sat.clamp(0.0, 1.0);
    if sat > 0.8 {
        100.0 - ((sat - 0.8) / 0.2) * 10.0
    } else if sat < 0.3 {
        70.0 * (sat / 0.3)
    } else {
        70.0 + 30.0 * ((sat - 0.3) / 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn findings() -> Findings {
        Findings::baseline()
    }

    #[test]
    fn test_variety_curve() {
        assert_eq!(variety_score(0), 70.0);
        assert_eq!(variety_score(1), 80.0);
        assert_eq!(variety_score(3), 100.0);
        assert_eq!(variety_score(5), 90.0);
        assert_eq!(variety_score(6), 85.0);
        assert_eq!(variety_score(7), 70.0);
        // Deep excess hits the floor
        assert_eq!(variety_score(12), 40.0);
    }

    #[test]
    fn test_contrast_levels() {
        assert_eq!(contrast_score(Some(ContrastLevel::High), None), 100.0);
        assert_eq!(contrast_score(Some(ContrastLevel::Medium), None), 75.0);
        assert_eq!(contrast_score(Some(ContrastLevel::Low), None), 50.0);
    }

    #[test]
    fn test_contrast_unknown_uses_brightness() {
        assert_eq!(contrast_score(None, Some(0.8)), 70.0);
        assert_eq!(contrast_score(None, Some(0.3)), 40.0);
        assert_eq!(contrast_score(None, None), 40.0);
    }

    #[test]
    fn test_color_match_weights_dominant_colors_more() {
        // Red is the baseline's most common range at 30%; a muted tone is
        // unmatched. Red first must beat red last.
        let red_first = vec![
            DominantColor::new("#E02020", 0.8, 0.5),
            DominantColor::new("#777777", 0.4, 0.3),
        ];
        let red_last = vec![
            DominantColor::new("#777777", 0.8, 0.5),
            DominantColor::new("#E02020", 0.4, 0.3),
        ];
        let first = color_match_score(&red_first, &findings());
        let last = color_match_score(&red_last, &findings());
        assert!(first > last, "dominant match {first} should beat trailing match {last}");

        // (30*2 + 20*1) / 3
        assert!((first - 26.666666666666668).abs() < 1e-9);
    }

    #[test]
    fn test_color_match_empty_default() {
        assert_eq!(color_match_score(&[], &findings()), DEFAULT_MATCH_SCORE);
    }

    #[test]
    fn test_color_match_ignores_rare_ranges() {
        // Other sits at exactly 10% in the baseline, below the strict
        // >10% floor, so a muted color is unmatched rather than credited.
        let muted = vec![DominantColor::new("#777777", 0.8, 0.5)];
        assert_eq!(color_match_score(&muted, &findings()), UNMATCHED_COLOR_SCORE);
    }

    #[test]
    fn test_saturation_bands() {
        assert_eq!(saturation_score(None), DEFAULT_SATURATION_SCORE);
        assert_eq!(saturation_score(Some(0.0)), 0.0);
        assert_eq!(saturation_score(Some(0.15)), 35.0);
        assert_eq!(saturation_score(Some(0.3)), 70.0);
        assert_eq!(saturation_score(Some(0.8)), 100.0);
        assert_eq!(saturation_score(Some(1.0)), 90.0);
    }

    #[test]
    fn test_visual_scenario_washed_out() {
        // One white color, low contrast: a weak thumbnail
        let features = VisionFeatures::empty().with_dominant_colors(vec![DominantColor::new(
            "#FFFFFF",
            0.9,
            0.8,
        )]);
        let features = VisionFeatures {
            color_contrast: Some(ContrastLevel::Low),
            ..features
        };
        let score = score_visual(&features, &findings());
        // 0.25*80 + 0.35*50 + 0.25*25 + 0.15*75 = 55
        assert!((score - 55.0).abs() < 1e-9, "got {score}");
    }
}
