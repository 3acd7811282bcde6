//! Persisted corpus findings: the aggregate statistics that scoring
//! normalizes against.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::color::ColorRange;

/// Schema version written into new findings artifacts.
pub const FINDINGS_SCHEMA_VERSION: u32 = 1;

/// Text statistics over a sampled corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TextFindings {
    /// Percentage of thumbnails carrying any text (0-100).
    pub pct_with_text: f64,

    /// Mean text-fragment count per thumbnail.
    pub avg_text_count: f64,

    /// Mean total character count per thumbnail.
    pub avg_char_count: f64,
}

/// Face statistics over a sampled corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FaceFindings {
    /// Percentage of thumbnails showing at least one face (0-100).
    pub pct_with_faces: f64,

    /// Mean face count per thumbnail.
    pub avg_face_count: f64,

    /// Mean combined face coverage (percent of actual image area).
    pub avg_face_coverage: f64,
}

/// One color range's share of all dominant-color observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ColorRangeStat {
    pub range: ColorRange,

    /// Number of dominant-color observations in this range.
    pub count: u64,

    /// Share of all observations (0-100).
    pub percentage: f64,
}

/// Color statistics over a sampled corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ColorFindings {
    /// Mean derived color score (0-100).
    pub avg_color_score: f64,

    /// Color ranges ranked by frequency, most common first.
    #[serde(default)]
    pub common_ranges: Vec<ColorRangeStat>,
}

/// One object label's frequency in the corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ObjectStat {
    pub label: String,
    pub count: u64,
}

/// Object statistics over a sampled corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ObjectFindings {
    /// Mean detected-object count per thumbnail.
    pub avg_object_count: f64,

    /// Object labels ranked by frequency (top 10).
    #[serde(default)]
    pub common_labels: Vec<ObjectStat>,
}

/// Aggregate statistics for one corpus slice (overall or one category).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CorpusStats {
    /// Number of thumbnails behind these statistics.
    pub sample_size: u64,

    pub text: TextFindings,
    pub faces: FaceFindings,
    pub colors: ColorFindings,
    pub objects: ObjectFindings,
}

impl CorpusStats {
    /// Neutral prior statistics used when no corpus has been analyzed.
    ///
    /// Counts are zero since no observations back these numbers; the
    /// percentages and means are priors chosen so scoring stays anchored.
    pub fn baseline() -> Self {
        Self {
            sample_size: 0,
            text: TextFindings {
                pct_with_text: 85.0,
                avg_text_count: 2.0,
                avg_char_count: 20.0,
            },
            faces: FaceFindings {
                pct_with_faces: 75.0,
                avg_face_count: 1.5,
                avg_face_coverage: 12.0,
            },
            colors: ColorFindings {
                avg_color_score: 65.0,
                common_ranges: vec![
                    ColorRangeStat {
                        range: ColorRange::Red,
                        count: 0,
                        percentage: 30.0,
                    },
                    ColorRangeStat {
                        range: ColorRange::White,
                        count: 0,
                        percentage: 25.0,
                    },
                    ColorRangeStat {
                        range: ColorRange::Blue,
                        count: 0,
                        percentage: 20.0,
                    },
                    ColorRangeStat {
                        range: ColorRange::Black,
                        count: 0,
                        percentage: 15.0,
                    },
                    ColorRangeStat {
                        range: ColorRange::Other,
                        count: 0,
                        percentage: 10.0,
                    },
                ],
            },
            objects: ObjectFindings {
                avg_object_count: 3.0,
                common_labels: Vec::new(),
            },
        }
    }
}

/// Persisted findings document, read-only at scoring time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Findings {
    /// Artifact schema version.
    pub schema_version: u32,

    /// Training run that produced these findings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<Uuid>,

    /// When the findings were generated.
    pub generated_at: DateTime<Utc>,

    /// Statistics over the whole sampled corpus.
    pub overall: CorpusStats,

    /// Statistics per content category, keyed by category id.
    #[serde(default)]
    pub categories: BTreeMap<String, CorpusStats>,
}

impl Findings {
    /// Neutral findings paired with [`crate::ScoringModel::fallback`] so the
    /// engine always has anchors to normalize against.
    pub fn baseline() -> Self {
        Self {
            schema_version: FINDINGS_SCHEMA_VERSION,
            run_id: None,
            generated_at: Utc::now(),
            overall: CorpusStats::baseline(),
            categories: BTreeMap::new(),
        }
    }

    /// Parse findings from their JSON artifact text.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Serialize to the pretty-printed artifact form.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
