//! Corpus sampling from the per-category popularity charts.
//!
//! Pages through the catalog until the target sample size is reached,
//! dropping duplicates, low-view videos, and short-form content along
//! the way.

use std::collections::HashSet;

use tracing::debug;
use tscore_models::{SampledVideo, VideoCategory};

use crate::clients::VideoCatalog;
use crate::config::TrainerConfig;
use crate::error::TrainerResult;

/// Pages request more than the target to absorb filtering losses.
const OVERSAMPLE_FACTOR: usize = 3;

/// Hard page-size cap imposed by the catalog API.
const MAX_PAGE_SIZE: usize = 50;

/// Consecutive pages contributing nothing before sampling gives up.
const STALL_LIMIT: u32 = 2;

/// Sample up to `config.sample_size` usable videos for one category.
///
/// A video is usable when it clears the minimum view count, is not
/// short-form content, and has not been seen on an earlier page.
pub async fn sample_category(
    catalog: &impl VideoCatalog,
    category: &VideoCategory,
    config: &TrainerConfig,
) -> TrainerResult<Vec<SampledVideo>> {
    let target = config.sample_size;
    let page_size = config
        .sample_size
        .saturating_mul(OVERSAMPLE_FACTOR)
        .min(MAX_PAGE_SIZE) as u32;

    let mut videos: Vec<SampledVideo> = Vec::with_capacity(target);
    let mut seen: HashSet<String> = HashSet::new();
    let mut page_token: Option<String> = None;
    let mut stalls = 0u32;

    for _ in 0..config.max_page_fetches {
        if videos.len() >= target {
            break;
        }

        let page = catalog
            .list_popular(&category.id, page_size, page_token.as_deref())
            .await?;

        let mut added = 0usize;
        for video in page.videos {
            if videos.len() >= target {
                break;
            }
            if !seen.insert(video.id.clone()) {
                continue;
            }
            if video.views < config.min_view_count {
                continue;
            }
            if video.is_short_form() {
                continue;
            }
            videos.push(video);
            added += 1;
        }

        debug!(
            category = %category.name,
            added,
            collected = videos.len(),
            "Processed catalog page"
        );

        if added == 0 {
            stalls += 1;
            if stalls >= STALL_LIMIT {
                break;
            }
        } else {
            stalls = 0;
        }

        page_token = page.next_page_token;
        if page_token.is_none() {
            break;
        }
    }

    Ok(videos)
}
