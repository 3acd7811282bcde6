//! End-to-end training pipeline.
//!
//! Samples each configured category, extracts thumbnail observations,
//! aggregates statistics, derives the model from the engagement
//! quartiles, and persists the artifacts. Categories that fail are
//! skipped; an empty corpus falls back to the default model rather
//! than leaving the engine without artifacts.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;
use tracing::{info, warn};
use tscore_engine::ModelSnapshot;
use tscore_models::{
    CategoryThresholds, CorpusStats, Findings, ScoringModel, ScoringWeights,
    FINDINGS_SCHEMA_VERSION,
};
use uuid::Uuid;

use crate::artifacts::{self, ArtifactPaths};
use crate::clients::{ThumbnailFetcher, VideoCatalog, VisionAnalyzer};
use crate::config::TrainerConfig;
use crate::error::TrainerResult;
use crate::extraction::{self, ThumbnailObservation};
use crate::model_builder;
use crate::quartiles;
use crate::sampling;
use crate::stats::StatsAccumulator;

/// What one training run produced.
#[derive(Debug, Clone)]
pub struct TrainingSummary {
    /// Identifier stamped into both artifacts.
    pub run_id: Uuid,

    /// Videos sampled across all categories.
    pub sampled_videos: usize,

    /// Thumbnails that yielded an observation.
    pub usable_thumbnails: usize,

    /// Categories that contributed at least one observation.
    pub categories_analyzed: usize,

    /// Whether the fallback model was written instead of a trained one.
    pub used_fallback: bool,

    /// The weights that were persisted.
    pub weights: ScoringWeights,

    /// Where the artifacts landed.
    pub artifacts: ArtifactPaths,
}

/// Run the full training pipeline.
pub async fn run(
    config: &TrainerConfig,
    catalog: &impl VideoCatalog,
    fetcher: &impl ThumbnailFetcher,
    vision: &impl VisionAnalyzer,
) -> TrainerResult<TrainingSummary> {
    let run_id = Uuid::new_v4();
    let generated_at = Utc::now();
    info!(run_id = %run_id, categories = config.categories.len(), "Starting training run");

    let mut all_observations: Vec<ThumbnailObservation> = Vec::new();
    let mut category_stats: BTreeMap<String, CorpusStats> = BTreeMap::new();
    let mut sampled_videos = 0usize;

    for category in &config.categories {
        let videos = match sampling::sample_category(catalog, category, config).await {
            Ok(videos) => videos,
            Err(err) => {
                warn!(category = %category.name, error = %err, "Skipping category: sampling failed");
                continue;
            }
        };
        if videos.is_empty() {
            warn!(category = %category.name, "Skipping category: no usable videos sampled");
            continue;
        }
        sampled_videos += videos.len();

        let observations = match extraction::extract_observations(
            fetcher,
            vision,
            videos,
            config.max_thumbnail_parallel,
        )
        .await
        {
            Ok(observations) => observations,
            Err(err) => {
                warn!(category = %category.name, error = %err, "Skipping category: extraction failed");
                continue;
            }
        };

        let mut accumulator = StatsAccumulator::new();
        for observation in &observations {
            accumulator.add(observation);
        }
        info!(
            category = %category.name,
            samples = accumulator.sample_count(),
            "Analyzed category"
        );
        category_stats.insert(category.id.clone(), accumulator.finalize());
        all_observations.extend(observations);
    }

    let usable_thumbnails = all_observations.len();
    let categories_analyzed = category_stats.len();

    let (model, findings, used_fallback) = if all_observations.is_empty() {
        warn!("No usable thumbnails in any category; writing fallback artifacts");
        let mut model = ScoringModel::fallback();
        model.run_id = Some(run_id);
        model.generated_at = generated_at;
        let mut findings = Findings::baseline();
        findings.run_id = Some(run_id);
        findings.generated_at = generated_at;
        (model, findings, true)
    } else {
        let mut overall = StatsAccumulator::new();
        for observation in &all_observations {
            overall.add(observation);
        }

        let split = quartiles::split_by_engagement(&all_observations);
        let mut high = StatsAccumulator::new();
        for observation in split.top.iter().copied() {
            high.add(observation);
        }
        let mut low = StatsAccumulator::new();
        for observation in split.bottom.iter().copied() {
            low.add(observation);
        }

        let categories: BTreeMap<String, CategoryThresholds> = config
            .categories
            .iter()
            .filter_map(|category| {
                category_stats.get(&category.id).map(|stats| {
                    (
                        category.id.clone(),
                        model_builder::derive_category_thresholds(&category.name, stats),
                    )
                })
            })
            .collect();

        let model = model_builder::build_model(
            run_id,
            generated_at,
            &high.finalize(),
            &low.finalize(),
            categories,
        );
        let findings = Findings {
            schema_version: FINDINGS_SCHEMA_VERSION,
            run_id: Some(run_id),
            generated_at,
            overall: overall.finalize(),
            categories: category_stats,
        };
        (model, findings, false)
    };

    // Refuse to persist a model the engine would refuse to load.
    let snapshot = ModelSnapshot::new(model, findings)?;
    let artifacts = artifacts::write_artifacts(
        Path::new(&config.output_dir),
        snapshot.model(),
        snapshot.findings(),
    )?;

    let summary = TrainingSummary {
        run_id,
        sampled_videos,
        usable_thumbnails,
        categories_analyzed,
        used_fallback,
        weights: *snapshot.weights(),
        artifacts,
    };
    info!(
        run_id = %run_id,
        sampled = summary.sampled_videos,
        usable = summary.usable_thumbnails,
        categories = summary.categories_analyzed,
        fallback = summary.used_fallback,
        "Training run complete"
    );
    Ok(summary)
}
