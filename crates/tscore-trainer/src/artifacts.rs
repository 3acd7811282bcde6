//! Atomic persistence of the trained artifacts.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;
use tscore_models::{Findings, ScoringModel};

use crate::error::{TrainerError, TrainerResult};

/// File name of the scoring model artifact.
pub const MODEL_FILENAME: &str = "scoring_model.json";

/// File name of the findings artifact.
pub const FINDINGS_FILENAME: &str = "findings.json";

/// Where one training run's artifacts were written.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub findings: PathBuf,
}

/// Write both artifacts under `output_dir`, creating it if needed.
///
/// Each file lands via a temporary sibling and a rename, so a crash
/// mid-write never leaves a torn artifact for the engine to read.
pub fn write_artifacts(
    output_dir: &Path,
    model: &ScoringModel,
    findings: &Findings,
) -> TrainerResult<ArtifactPaths> {
    fs::create_dir_all(output_dir).map_err(|e| {
        TrainerError::artifact_write(format!("creating {}: {e}", output_dir.display()))
    })?;

    let paths = ArtifactPaths {
        model: output_dir.join(MODEL_FILENAME),
        findings: output_dir.join(FINDINGS_FILENAME),
    };

    write_atomic(&paths.model, &model.to_json_pretty()?)?;
    write_atomic(&paths.findings, &findings.to_json_pretty()?)?;

    info!(
        model = %paths.model.display(),
        findings = %paths.findings.display(),
        "Wrote training artifacts"
    );
    Ok(paths)
}

fn write_atomic(path: &Path, contents: &str) -> TrainerResult<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents)
        .map_err(|e| TrainerError::artifact_write(format!("writing {}: {e}", tmp.display())))?;
    fs::rename(&tmp, path).map_err(|e| {
        TrainerError::artifact_write(format!("renaming into {}: {e}", path.display()))
    })?;
    Ok(())
}
