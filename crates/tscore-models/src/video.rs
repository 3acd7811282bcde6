//! Sampled video metadata consumed by the corpus trainer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A content category to sample, id per the upstream catalog taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VideoCategory {
    /// Catalog category id (e.g. "20" for Gaming).
    pub id: String,

    /// Display name.
    pub name: String,
}

impl VideoCategory {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One candidate video drawn from the popularity sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SampledVideo {
    /// Upstream video id.
    pub id: String,

    /// Video title.
    pub title: String,

    /// Video description.
    #[serde(default)]
    pub description: String,

    /// Category the video was sampled under.
    pub category_id: String,

    /// Thumbnail URL (highest resolution available).
    pub thumbnail_url: String,

    /// View count at sampling time.
    pub views: u64,

    /// Like count at sampling time.
    pub likes: u64,

    /// Comment count at sampling time.
    pub comments: u64,

    /// Duration in seconds.
    pub duration_secs: u64,
}

impl SampledVideo {
    /// Engagement proxy: (likes + comments) / views x 100, rounded to two
    /// decimal places.
    ///
    /// True click-through rate is not publicly available, so this proxy
    /// stands in wherever "CTR" appears downstream. Zero views yields 0.0.
    pub fn engagement_rate(&self) -> f64 {
        if self.views == 0 {
            return 0.0;
        }
        let rate = (self.likes + self.comments) as f64 / self.views as f64 * 100.0;
        (rate * 100.0).round() / 100.0
    }

    /// Whether the video looks like short-form content.
    ///
    /// Shorts are excluded from sampling: duration at or under 60 seconds
    /// combined with any of the URL, title, or description signalling
    /// shorts.
    pub fn is_short_form(&self) -> bool {
        if self.duration_secs > 60 {
            return false;
        }
        self.thumbnail_url.contains("/shorts/")
            || self.title.to_lowercase().contains("#shorts")
            || self.description.to_lowercase().contains("#shorts")
    }
}
