//! Shared score-combination helpers.
//!
//! Every component scorer and the overall combiner funnel through
//! [`weighted_average`] so partial weight sets normalize identically
//! everywhere.

/// Weighted average over (value, weight) pairs: sum(value x weight) / sum(weight).
///
/// Pairs with non-positive weight are skipped, which is how scorers drop
/// signals that do not apply. An empty or all-zero-weight set yields 0.0.
pub fn weighted_average(pairs: &[(f64, f64)]) -> f64 {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for &(value, weight) in pairs {
        if weight > 0.0 {
            weighted_sum += value * weight;
            weight_total += weight;
        }
    }
    if weight_total > 0.0 {
        weighted_sum / weight_total
    } else {
        0.0
    }
}

/// Score a value by closeness to a corpus average.
///
/// 70 is the midpoint; the deviation from the average earns up to
/// `max_bonus` above it and costs at most 20 below it, clamped to 0-100.
/// A non-positive average yields the neutral midpoint.
pub fn normalize_around_average(value: f64, average: f64, max_bonus: f64) -> f64 {
    if average <= 0.0 {
        return 70.0;
    }
    let deviation = (value - average) / average * max_bonus;
    (70.0 + deviation.clamp(-20.0, max_bonus)).clamp(0.0, 100.0)
}

/// Clamp to the score range and round to the nearest integer.
pub fn clamp_round(score: f64) -> u8 {
    score.clamp(0.0, 100.0).round() as u8
}
