//! Aggregation of thumbnail observations into corpus statistics.

use std::collections::BTreeMap;

use tscore_models::{
    ColorFindings, ColorRange, ColorRangeStat, CorpusStats, FaceFindings, ObjectFindings,
    ObjectStat, TextFindings,
};

use crate::extraction::ThumbnailObservation;

/// Object labels kept in the ranked frequency list.
const TOP_OBJECT_LABELS: usize = 10;

/// Running totals over a stream of observations.
///
/// One accumulator covers one corpus slice: the whole run, a single
/// category, or an engagement quartile.
#[derive(Debug, Default)]
pub struct StatsAccumulator {
    samples: u64,
    with_text: u64,
    with_faces: u64,
    total_text_fragments: u64,
    total_text_chars: u64,
    total_faces: u64,
    total_face_coverage: f64,
    total_color_score: f64,
    total_objects: u64,
    color_ranges: BTreeMap<ColorRange, u64>,
    object_labels: BTreeMap<String, u64>,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of observations added so far.
    pub fn sample_count(&self) -> u64 {
        self.samples
    }

    /// Fold one observation into the running totals.
    pub fn add(&mut self, observation: &ThumbnailObservation) {
        self.samples += 1;

        let features = &observation.features;

        let fragments = features
            .detected_text
            .as_ref()
            .map(|t| t.len() as u64)
            .unwrap_or(0);
        if fragments > 0 {
            self.with_text += 1;
        }
        self.total_text_fragments += fragments;
        self.total_text_chars += features.total_text_chars() as u64;

        let faces = features.faces.as_ref().map(|f| f.len() as u64).unwrap_or(0);
        if faces > 0 {
            self.with_faces += 1;
        }
        self.total_faces += faces;
        self.total_face_coverage += features.total_face_coverage();

        self.total_color_score += observation.color_score;
        for color in features.dominant_colors.as_deref().unwrap_or_default() {
            if let Ok(range) = ColorRange::classify_hex(&color.hex) {
                *self.color_ranges.entry(range).or_default() += 1;
            }
        }

        self.total_objects += observation.object_labels.len() as u64;
        for label in &observation.object_labels {
            *self.object_labels.entry(label.clone()).or_default() += 1;
        }
    }

    /// Close out the totals into corpus statistics.
    ///
    /// Range percentages are shares of classified color observations,
    /// not of thumbnails. Ties in the ranked lists resolve in key
    /// order, keeping output deterministic.
    pub fn finalize(&self) -> CorpusStats {
        if self.samples == 0 {
            return CorpusStats {
                sample_size: 0,
                text: TextFindings {
                    pct_with_text: 0.0,
                    avg_text_count: 0.0,
                    avg_char_count: 0.0,
                },
                faces: FaceFindings {
                    pct_with_faces: 0.0,
                    avg_face_count: 0.0,
                    avg_face_coverage: 0.0,
                },
                colors: ColorFindings {
                    avg_color_score: 0.0,
                    common_ranges: Vec::new(),
                },
                objects: ObjectFindings {
                    avg_object_count: 0.0,
                    common_labels: Vec::new(),
                },
            };
        }

        let n = self.samples as f64;
        let classified: u64 = self.color_ranges.values().sum();

        let mut common_ranges: Vec<ColorRangeStat> = self
            .color_ranges
            .iter()
            .map(|(range, count)| ColorRangeStat {
                range: *range,
                count: *count,
                percentage: if classified > 0 {
                    *count as f64 / classified as f64 * 100.0
                } else {
                    0.0
                },
            })
            .collect();
        common_ranges.sort_by(|a, b| b.count.cmp(&a.count));

        let mut common_labels: Vec<ObjectStat> = self
            .object_labels
            .iter()
            .map(|(label, count)| ObjectStat {
                label: label.clone(),
                count: *count,
            })
            .collect();
        common_labels.sort_by(|a, b| b.count.cmp(&a.count));
        common_labels.truncate(TOP_OBJECT_LABELS);

        CorpusStats {
            sample_size: self.samples,
            text: TextFindings {
                pct_with_text: self.with_text as f64 / n * 100.0,
                avg_text_count: self.total_text_fragments as f64 / n,
                avg_char_count: self.total_text_chars as f64 / n,
            },
            faces: FaceFindings {
                pct_with_faces: self.with_faces as f64 / n * 100.0,
                avg_face_count: self.total_faces as f64 / n,
                avg_face_coverage: self.total_face_coverage / n,
            },
            colors: ColorFindings {
                avg_color_score: self.total_color_score / n,
                common_ranges,
            },
            objects: ObjectFindings {
                avg_object_count: self.total_objects as f64 / n,
                common_labels,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tscore_models::{BoundingPoly, DominantColor, FaceDetection, SampledVideo, VisionFeatures};

    fn video(id: &str) -> SampledVideo {
        SampledVideo {
            id: id.to_string(),
            title: format!("Video {id}"),
            description: String::new(),
            category_id: "20".to_string(),
            thumbnail_url: format!("https://img.example.com/{id}.jpg"),
            views: 100_000,
            likes: 5_000,
            comments: 800,
            duration_secs: 600,
        }
    }

    fn observation(
        id: &str,
        text: &[&str],
        face_coverages: &[f64],
        colors: &[&str],
        color_score: f64,
        objects: &[&str],
    ) -> ThumbnailObservation {
        let faces = face_coverages
            .iter()
            .map(|pct| {
                FaceDetection::new(BoundingPoly::from_rect(0.0, 0.0, 10.0, 10.0), *pct, 0.9)
            })
            .collect();
        let dominant = colors
            .iter()
            .enumerate()
            .map(|(i, hex)| DominantColor::new(*hex, 0.5 - 0.05 * i as f64, 0.1))
            .collect();
        let features = VisionFeatures::empty()
            .with_detected_text(text.iter().map(|s| s.to_string()).collect())
            .with_dominant_colors(dominant)
            .with_faces(faces);

        ThumbnailObservation {
            video: video(id),
            features,
            object_labels: objects.iter().map(|s| s.to_string()).collect(),
            color_score,
            image_area: Some(921_600.0),
        }
    }

    #[test]
    fn test_two_observation_stats() {
        let mut acc = StatsAccumulator::new();
        acc.add(&observation(
            "a",
            &["EPIC", "WIN"],
            &[10.0],
            &["#FF0000", "#FFFFFF"],
            80.0,
            &["Person"],
        ));
        acc.add(&observation("b", &[], &[], &["#FF2020"], 40.0, &["Person", "Dog"]));

        let stats = acc.finalize();

        assert_eq!(stats.sample_size, 2);
        assert_eq!(stats.text.pct_with_text, 50.0);
        assert_eq!(stats.text.avg_text_count, 1.0);
        assert_eq!(stats.text.avg_char_count, 3.5);
        assert_eq!(stats.faces.pct_with_faces, 50.0);
        assert_eq!(stats.faces.avg_face_count, 0.5);
        assert_eq!(stats.faces.avg_face_coverage, 5.0);
        assert_eq!(stats.colors.avg_color_score, 60.0);
        assert_eq!(stats.objects.avg_object_count, 1.5);

        // Two of three classified colors are red
        assert_eq!(stats.colors.common_ranges[0].range, ColorRange::Red);
        assert_eq!(stats.colors.common_ranges[0].count, 2);
        assert!((stats.colors.common_ranges[0].percentage - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.colors.common_ranges[1].range, ColorRange::White);
        assert_eq!(stats.colors.common_ranges[1].count, 1);

        assert_eq!(stats.objects.common_labels[0].label, "Person");
        assert_eq!(stats.objects.common_labels[0].count, 2);
        assert_eq!(stats.objects.common_labels[1].label, "Dog");
    }

    #[test]
    fn test_empty_accumulator_finalizes_to_zeros() {
        let stats = StatsAccumulator::new().finalize();
        assert_eq!(stats.sample_size, 0);
        assert_eq!(stats.text.pct_with_text, 0.0);
        assert_eq!(stats.faces.avg_face_count, 0.0);
        assert_eq!(stats.colors.avg_color_score, 0.0);
        assert!(stats.colors.common_ranges.is_empty());
        assert!(stats.objects.common_labels.is_empty());
    }

    #[test]
    fn test_unparseable_colors_do_not_count() {
        let mut acc = StatsAccumulator::new();
        acc.add(&observation(
            "a",
            &[],
            &[],
            &["garbage", "#0000FF"],
            50.0,
            &[],
        ));

        let stats = acc.finalize();
        assert_eq!(stats.colors.common_ranges.len(), 1);
        assert_eq!(stats.colors.common_ranges[0].range, ColorRange::Blue);
        assert_eq!(stats.colors.common_ranges[0].percentage, 100.0);
    }

    #[test]
    fn test_object_labels_ranked_and_truncated() {
        let mut acc = StatsAccumulator::new();
        let many: Vec<String> = (0..12).map(|i| format!("Label{i:02}")).collect();
        let many_refs: Vec<&str> = many.iter().map(String::as_str).collect();
        acc.add(&observation("a", &[], &[], &[], 0.0, &many_refs));
        acc.add(&observation("b", &[], &[], &[], 0.0, &["Label07"]));

        let stats = acc.finalize();
        assert_eq!(stats.objects.common_labels.len(), TOP_OBJECT_LABELS);
        assert_eq!(stats.objects.common_labels[0].label, "Label07");
        assert_eq!(stats.objects.common_labels[0].count, 2);
    }
}
