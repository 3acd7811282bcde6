//! Artifact access: load-once snapshots plus the hot-swappable store.
//!
//! The trainer writes `scoring_model.json` and `findings.json`; this module
//! loads and validates them into an immutable [`ModelSnapshot`] that scoring
//! borrows. [`ModelStore`] shares one snapshot behind an `Arc` and replaces
//! it wholesale on reload, so in-flight scoring never observes a partial
//! update.

use std::path::Path;
use std::sync::{Arc, RwLock};

use tracing::{info, warn};
use tscore_models::{
    CategoryThresholds, ColorRangeStat, Findings, ScoreResult, ScoringModel, ScoringThresholds,
    ScoringWeights, VisionFeatures,
};

use crate::error::{EngineError, EngineResult};

/// Minimum corpus share (percent, exclusive) for a color range to count as
/// common when matching dominant colors.
pub const COMMON_RANGE_MIN_SHARE: f64 = 10.0;

/// Ranked common color ranges above the share floor.
pub fn common_color_ranges(findings: &Findings) -> impl Iterator<Item = &ColorRangeStat> {
    findings
        .overall
        .colors
        .common_ranges
        .iter()
        .filter(|stat| stat.percentage > COMMON_RANGE_MIN_SHARE)
}

/// One immutable (model, findings) pair consumed by scoring.
#[derive(Debug, Clone)]
pub struct ModelSnapshot {
    model: ScoringModel,
    findings: Findings,
}

impl ModelSnapshot {
    /// Bundle an already-loaded pair, validating model invariants.
    pub fn new(model: ScoringModel, findings: Findings) -> EngineResult<Self> {
        model.validate().map_err(EngineError::InvalidModel)?;
        Ok(Self { model, findings })
    }

    /// The hard-coded default model paired with baseline findings.
    pub fn fallback() -> Self {
        Self {
            model: ScoringModel::fallback(),
            findings: Findings::baseline(),
        }
    }

    /// Load and validate both artifacts from disk.
    ///
    /// Missing files surface as `ModelUnavailable` and parse failures as
    /// `ArtifactCorrupt`; the engine refuses to score with zeroed or
    /// partial weights.
    pub fn load(
        model_path: impl AsRef<Path>,
        findings_path: impl AsRef<Path>,
    ) -> EngineResult<Self> {
        let model_raw = read_artifact(model_path.as_ref())?;
        let model = ScoringModel::from_json(&model_raw).map_err(|source| {
            EngineError::ArtifactCorrupt {
                path: model_path.as_ref().display().to_string(),
                source,
            }
        })?;

        let findings_raw = read_artifact(findings_path.as_ref())?;
        let findings =
            Findings::from_json(&findings_raw).map_err(|source| EngineError::ArtifactCorrupt {
                path: findings_path.as_ref().display().to_string(),
                source,
            })?;

        Self::new(model, findings)
    }

    pub fn model(&self) -> &ScoringModel {
        &self.model
    }

    pub fn findings(&self) -> &Findings {
        &self.findings
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.model.weights
    }

    pub fn thresholds(&self) -> &ScoringThresholds {
        &self.model.thresholds
    }

    /// Thresholds for one category, when the model carries them.
    pub fn category_thresholds(&self, category_id: &str) -> Option<&CategoryThresholds> {
        self.model.categories.get(category_id)
    }

    /// Ranked common color ranges above the share floor.
    pub fn common_color_ranges(&self) -> Vec<&ColorRangeStat> {
        common_color_ranges(&self.findings).collect()
    }

    /// Score a thumbnail against this snapshot.
    pub fn score(&self, features: &VisionFeatures) -> EngineResult<ScoreResult> {
        crate::score::score(features, &self.model, &self.findings)
    }
}

fn read_artifact(path: &Path) -> EngineResult<String> {
    std::fs::read_to_string(path).map_err(|err| {
        EngineError::model_unavailable(format!("cannot read {}: {err}", path.display()))
    })
}

/// Shared, hot-swappable snapshot handle.
///
/// Readers grab an `Arc` per scoring request; a reload builds the
/// replacement off to the side and swaps the pointer.
pub struct ModelStore {
    current: RwLock<Arc<ModelSnapshot>>,
}

impl ModelStore {
    /// Start from an explicit snapshot.
    pub fn new(snapshot: ModelSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Start from artifacts on disk, falling back to the default model
    /// when they cannot be loaded.
    pub fn load_or_fallback(
        model_path: impl AsRef<Path>,
        findings_path: impl AsRef<Path>,
    ) -> Self {
        match ModelSnapshot::load(&model_path, &findings_path) {
            Ok(snapshot) => {
                info!(
                    model_path = %model_path.as_ref().display(),
                    "loaded scoring model artifacts"
                );
                Self::new(snapshot)
            }
            Err(err) => {
                warn!(error = %err, "falling back to default scoring model");
                Self::new(ModelSnapshot::fallback())
            }
        }
    }

    /// Current snapshot; cheap enough to call per scoring request.
    ///
    /// Only whole-pointer swaps happen under this lock, so a poisoned lock
    /// still holds a coherent snapshot and is recovered rather than
    /// propagated.
    pub fn snapshot(&self) -> Arc<ModelSnapshot> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Replace the snapshot atomically.
    pub fn swap(&self, snapshot: ModelSnapshot) {
        let next = Arc::new(snapshot);
        match self.current.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }

    /// Re-read the artifacts and swap them in on success.
    ///
    /// A failed reload leaves the previous snapshot serving.
    pub fn reload(
        &self,
        model_path: impl AsRef<Path>,
        findings_path: impl AsRef<Path>,
    ) -> EngineResult<()> {
        let snapshot = ModelSnapshot::load(&model_path, &findings_path)?;
        info!(
            model_path = %model_path.as_ref().display(),
            findings_path = %findings_path.as_ref().display(),
            "scoring model reloaded"
        );
        self.swap(snapshot);
        Ok(())
    }
}
