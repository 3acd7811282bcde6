//! Engagement-quartile split over the sampled corpus.
//!
//! Weight and threshold derivation compares the most-engaging quartile
//! of thumbnails against the least-engaging one.

use std::cmp::Ordering;

use crate::extraction::ThumbnailObservation;

/// The two engagement extremes of a ranked corpus.
#[derive(Debug)]
pub struct QuartileSplit<'a> {
    /// Most-engaging quartile, best first.
    pub top: Vec<&'a ThumbnailObservation>,

    /// Least-engaging quartile, still in descending engagement order.
    pub bottom: Vec<&'a ThumbnailObservation>,
}

/// Size of one quartile for a corpus of `n` observations.
///
/// Never zero for a non-empty corpus; with fewer than four samples a
/// single observation stands in for the whole quartile.
pub fn quartile_len(n: usize) -> usize {
    (n / 4).max(1)
}

/// Split observations into their top and bottom engagement quartiles.
///
/// Ranking is by engagement rate descending with video id as the
/// tiebreak, so equal rates split the same way on every run. With a
/// single observation both quartiles hold that observation.
pub fn split_by_engagement(observations: &[ThumbnailObservation]) -> QuartileSplit<'_> {
    if observations.is_empty() {
        return QuartileSplit {
            top: Vec::new(),
            bottom: Vec::new(),
        };
    }

    let mut ranked: Vec<&ThumbnailObservation> = observations.iter().collect();
    ranked.sort_by(|a, b| {
        b.video
            .engagement_rate()
            .partial_cmp(&a.video.engagement_rate())
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.video.id.cmp(&b.video.id))
    });

    let q = quartile_len(ranked.len());
    let top = ranked[..q].to_vec();
    let bottom = ranked[ranked.len() - q..].to_vec();

    QuartileSplit { top, bottom }
}
