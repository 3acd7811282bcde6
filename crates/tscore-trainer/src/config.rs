//! Trainer configuration.

use std::time::Duration;

use tscore_models::VideoCategory;

/// Categories sampled when `TRAINER_CATEGORIES` is not set.
const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("20", "Gaming"),
    ("10", "Music"),
    ("24", "Entertainment"),
    ("23", "Comedy"),
    ("28", "Science & Technology"),
];

/// Trainer configuration.
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    /// Content categories to sample.
    pub categories: Vec<VideoCategory>,
    /// Target number of qualifying videos per category.
    pub sample_size: usize,
    /// Minimum view count for a video to qualify.
    pub min_view_count: u64,
    /// Maximum concurrent thumbnail pipelines (download + vision analysis)
    pub max_thumbnail_parallel: usize,
    /// Maximum catalog pages fetched per category.
    pub max_page_fetches: u32,
    /// Directory the model and findings artifacts are written to.
    pub output_dir: String,
    /// Timeout applied to catalog, thumbnail, and vision requests.
    pub request_timeout: Duration,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            sample_size: 20,
            min_view_count: 10_000,
            max_thumbnail_parallel: 4,
            max_page_fetches: 5,
            output_dir: "./artifacts".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl TrainerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            categories: std::env::var("TRAINER_CATEGORIES")
                .ok()
                .map(|s| parse_categories(&s))
                .filter(|parsed| !parsed.is_empty())
                .unwrap_or_else(default_categories),
            sample_size: std::env::var("TRAINER_SAMPLE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(20),
            min_view_count: std::env::var("TRAINER_MIN_VIEW_COUNT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10_000),
            max_thumbnail_parallel: std::env::var("TRAINER_MAX_THUMBNAIL_PARALLEL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(4),
            max_page_fetches: std::env::var("TRAINER_MAX_PAGE_FETCHES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            output_dir: std::env::var("TRAINER_OUTPUT_DIR")
                .unwrap_or_else(|_| "./artifacts".to_string()),
            request_timeout: Duration::from_secs(
                std::env::var("TRAINER_REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }
}

fn default_categories() -> Vec<VideoCategory> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|(id, name)| VideoCategory::new(*id, *name))
        .collect()
}

/// Parse a `id=name,id=name` category list. Malformed entries are dropped.
fn parse_categories(raw: &str) -> Vec<VideoCategory> {
    raw.split(',')
        .filter_map(|entry| {
            let (id, name) = entry.split_once('=')?;
            let id = id.trim();
            let name = name.trim();
            if id.is_empty() || name.is_empty() {
                return None;
            }
            Some(VideoCategory::new(id, name))
        })
        .collect()
}
