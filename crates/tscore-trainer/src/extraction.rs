//! Thumbnail feature extraction.
//!
//! Downloads each sampled thumbnail, decodes its dimensions, runs the
//! vision analysis, and assembles the per-thumbnail observation the
//! aggregation stage consumes. Failed thumbnails are skipped rather
//! than failing the run.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use tscore_models::color::{contrast_ratio, saturation};
use tscore_models::{DominantColor, FaceDetection, SampledVideo, VisionFeatures};

use crate::clients::{RawVisionSignals, ThumbnailFetcher, VisionAnalyzer};
use crate::error::{TrainerError, TrainerResult};

/// Dominant colors kept per thumbnail, highest score first.
const MAX_DOMINANT_COLORS: usize = 5;

/// Weight of the contrast component in the color score.
const COLOR_CONTRAST_WEIGHT: f64 = 0.6;

/// Weight of the saturation component in the color score.
const COLOR_SATURATION_WEIGHT: f64 = 0.4;

/// Contrast ratios spread over 0..=100 across this span above 1.0.
const CONTRAST_SPAN: f64 = 20.0;

/// Colors sampled for the saturation component.
const SATURATION_SAMPLE: usize = 3;

/// Everything extracted from one sampled thumbnail.
#[derive(Debug, Clone)]
pub struct ThumbnailObservation {
    /// The video the thumbnail belongs to.
    pub video: SampledVideo,

    /// Vision features in the same shape the scorer consumes.
    pub features: VisionFeatures,

    /// Object labels localized in the thumbnail.
    pub object_labels: Vec<String>,

    /// Composite 0..=100 color quality score.
    pub color_score: f64,

    /// Decoded pixel area, when the image bytes could be decoded.
    pub image_area: Option<f64>,
}

/// Extract observations for a batch of sampled videos.
///
/// Thumbnails are processed concurrently up to `max_parallel` at a
/// time. Individual failures are logged and skipped; the batch only
/// fails when every thumbnail failed.
pub async fn extract_observations(
    fetcher: &impl ThumbnailFetcher,
    vision: &impl VisionAnalyzer,
    videos: Vec<SampledVideo>,
    max_parallel: usize,
) -> TrainerResult<Vec<ThumbnailObservation>> {
    let attempted = videos.len();
    let semaphore = Arc::new(Semaphore::new(max_parallel.max(1)));

    let futures: Vec<_> = videos
        .into_iter()
        .map(|video| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return Err((
                            video.id.clone(),
                            TrainerError::thumbnail_failed("concurrency limiter closed"),
                        ))
                    }
                };
                extract_one(fetcher, vision, video).await
            }
        })
        .collect();

    let results = join_all(futures).await;

    let mut observations = Vec::with_capacity(attempted);
    for result in results {
        match result {
            Ok(observation) => observations.push(observation),
            Err((video_id, err)) => {
                warn!(video_id = %video_id, error = %err, "Skipping thumbnail");
            }
        }
    }

    if observations.is_empty() && attempted > 0 {
        return Err(TrainerError::no_usable_samples(format!(
            "all {attempted} thumbnails failed extraction"
        )));
    }

    info!(
        usable = observations.len(),
        attempted,
        "Extracted thumbnail observations"
    );
    Ok(observations)
}

async fn extract_one(
    fetcher: &impl ThumbnailFetcher,
    vision: &impl VisionAnalyzer,
    video: SampledVideo,
) -> Result<ThumbnailObservation, (String, TrainerError)> {
    let bytes = match fetcher.fetch(&video.thumbnail_url).await {
        Ok(bytes) => bytes,
        Err(err) => return Err((video.id, err)),
    };
    let image_area = decode_area(&bytes, &video.id);
    let signals = match vision.analyze(&bytes).await {
        Ok(signals) => signals,
        Err(err) => return Err((video.id, err)),
    };
    Ok(assemble_observation(video, signals, image_area))
}

/// Decoded pixel area of the thumbnail. Undecodable bytes leave face
/// coverage relative to the reference frame instead.
fn decode_area(bytes: &[u8], video_id: &str) -> Option<f64> {
    match image::load_from_memory(bytes) {
        Ok(decoded) => Some(f64::from(decoded.width()) * f64::from(decoded.height())),
        Err(err) => {
            debug!(video_id = %video_id, error = %err, "Could not decode thumbnail dimensions");
            None
        }
    }
}

fn assemble_observation(
    video: SampledVideo,
    signals: RawVisionSignals,
    image_area: Option<f64>,
) -> ThumbnailObservation {
    let faces: Vec<FaceDetection> = signals
        .faces
        .into_iter()
        .map(|raw| {
            let mut face = FaceDetection::from_poly(raw.bounding, image_area, raw.confidence);
            face.expressions = raw.expressions;
            face
        })
        .collect();

    let mut colors = signals.colors;
    colors.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    colors.truncate(MAX_DOMINANT_COLORS);

    let color_score = color_score(&colors);

    let features = VisionFeatures::empty()
        .with_detected_text(signals.text_fragments)
        .with_dominant_colors(colors)
        .with_faces(faces);

    ThumbnailObservation {
        video,
        features,
        object_labels: signals.object_labels,
        color_score,
        image_area,
    }
}

/// Composite 0..=100 color quality score.
///
/// Contrast between the two strongest colors carries most of the
/// weight; average saturation over the top colors carries the rest.
pub(crate) fn color_score(colors: &[DominantColor]) -> f64 {
    let parseable: Vec<((u8, u8, u8), f64)> = colors
        .iter()
        .filter_map(|c| c.rgb().map(|rgb| (rgb, c.score)))
        .collect();

    let contrast_part = if parseable.len() >= 2 {
        let ratio = contrast_ratio(parseable[0].0, parseable[1].0);
        ((ratio - 1.0) / CONTRAST_SPAN * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };

    let sampled = &parseable[..parseable.len().min(SATURATION_SAMPLE)];
    let score_total: f64 = sampled.iter().map(|(_, score)| score).sum();
    let saturation_part = if score_total > 0.0 {
        let weighted: f64 = sampled
            .iter()
            .map(|((r, g, b), score)| saturation(*r, *g, *b) * score)
            .sum();
        weighted / score_total * 100.0
    } else {
        0.0
    };

    (COLOR_CONTRAST_WEIGHT * contrast_part + COLOR_SATURATION_WEIGHT * saturation_part).round()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tscore_models::{BoundingPoly, Expression};

    use crate::clients::RawFaceSignal;

    struct ByteFetcher {
        bytes: Vec<u8>,
    }

    impl ThumbnailFetcher for ByteFetcher {
        async fn fetch(&self, _url: &str) -> TrainerResult<Vec<u8>> {
            Ok(self.bytes.clone())
        }
    }

    struct FlakyFetcher {
        bytes: Vec<u8>,
        fail_id: String,
    }

    impl ThumbnailFetcher for FlakyFetcher {
        async fn fetch(&self, url: &str) -> TrainerResult<Vec<u8>> {
            if url.contains(&self.fail_id) {
                return Err(TrainerError::thumbnail_failed("connection reset"));
            }
            Ok(self.bytes.clone())
        }
    }

    struct FailingFetcher;

    impl ThumbnailFetcher for FailingFetcher {
        async fn fetch(&self, _url: &str) -> TrainerResult<Vec<u8>> {
            Err(TrainerError::thumbnail_failed("connection reset"))
        }
    }

    struct StaticVision {
        signals: RawVisionSignals,
    }

    impl VisionAnalyzer for StaticVision {
        async fn analyze(&self, _image: &[u8]) -> TrainerResult<RawVisionSignals> {
            Ok(self.signals.clone())
        }
    }

    struct GaugedVision {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    impl GaugedVision {
        fn new() -> Self {
            Self {
                current: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    impl VisionAnalyzer for GaugedVision {
        async fn analyze(&self, _image: &[u8]) -> TrainerResult<RawVisionSignals> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            Ok(RawVisionSignals::default())
        }
    }

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

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::new(width, height));
        let mut buf = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut buf),
            image::ImageOutputFormat::Png,
        )
        .unwrap();
        buf
    }

    fn face_signals() -> RawVisionSignals {
        RawVisionSignals {
            text_fragments: vec!["EPIC".to_string(), "WIN".to_string()],
            faces: vec![RawFaceSignal {
                bounding: BoundingPoly::from_rect(0.0, 0.0, 64.0, 36.0),
                confidence: 0.9,
                expressions: vec![Expression::Joy],
            }],
            colors: vec![
                DominantColor::new("#FFFFFF", 0.5, 0.4),
                DominantColor::new("#000000", 0.3, 0.3),
            ],
            object_labels: vec!["Person".to_string()],
        }
    }

    #[test]
    fn test_color_score_black_on_white() {
        let colors = vec![
            DominantColor::new("#FFFFFF", 0.5, 0.4),
            DominantColor::new("#000000", 0.3, 0.3),
        ];
        // Contrast ratio 21 maxes the contrast part; both colors have
        // zero saturation.
        assert_eq!(color_score(&colors), 60.0);
    }

    #[test]
    fn test_color_score_empty() {
        assert_eq!(color_score(&[]), 0.0);
    }

    #[test]
    fn test_color_score_single_saturated_color() {
        let colors = vec![DominantColor::new("#FF0000", 1.0, 0.8)];
        // No second color for contrast; full saturation contributes 40.
        assert_eq!(color_score(&colors), 40.0);
    }

    #[test]
    fn test_color_score_ignores_unparseable_colors() {
        let colors = vec![
            DominantColor::new("not-a-color", 0.9, 0.5),
            DominantColor::new("#FFFFFF", 0.5, 0.4),
            DominantColor::new("#000000", 0.3, 0.3),
        ];
        assert_eq!(color_score(&colors), 60.0);
    }

    #[tokio::test]
    async fn test_extract_assembles_features() {
        let fetcher = ByteFetcher {
            bytes: png_bytes(640, 360),
        };
        let vision = StaticVision {
            signals: face_signals(),
        };

        let observations = extract_observations(&fetcher, &vision, vec![video("a")], 4)
            .await
            .unwrap();

        assert_eq!(observations.len(), 1);
        let obs = &observations[0];
        assert_eq!(obs.video.id, "a");
        assert_eq!(obs.image_area, Some(230_400.0));
        assert_eq!(obs.object_labels, vec!["Person"]);
        assert_eq!(obs.color_score, 60.0);

        let faces = obs.features.faces.as_ref().unwrap();
        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].expressions, vec![Expression::Joy]);
        // 64x36 face inside a 640x360 frame covers one percent
        assert!((faces[0].size_percent - 1.0).abs() < 1e-9);
        assert_eq!(obs.features.total_text_chars(), 7);
    }

    #[tokio::test]
    async fn test_extract_falls_back_to_reference_area() {
        let fetcher = ByteFetcher {
            bytes: b"not an image".to_vec(),
        };
        let vision = StaticVision {
            signals: face_signals(),
        };

        let observations = extract_observations(&fetcher, &vision, vec![video("a")], 4)
            .await
            .unwrap();

        let obs = &observations[0];
        assert_eq!(obs.image_area, None);
        // 64x36 face against the 1280x720 reference frame
        let faces = obs.features.faces.as_ref().unwrap();
        assert!((faces[0].size_percent - 0.25).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_extract_skips_failed_thumbnails() {
        let fetcher = FlakyFetcher {
            bytes: png_bytes(64, 36),
            fail_id: "v1".to_string(),
        };
        let vision = StaticVision {
            signals: RawVisionSignals::default(),
        };
        let videos = vec![video("v0"), video("v1"), video("v2")];

        let observations = extract_observations(&fetcher, &vision, videos, 4)
            .await
            .unwrap();

        let ids: Vec<&str> = observations.iter().map(|o| o.video.id.as_str()).collect();
        assert_eq!(ids, vec!["v0", "v2"]);
    }

    #[tokio::test]
    async fn test_extract_all_failures_is_no_usable_samples() {
        let vision = StaticVision {
            signals: RawVisionSignals::default(),
        };
        let videos = vec![video("v0"), video("v1")];

        let err = extract_observations(&FailingFetcher, &vision, videos, 4)
            .await
            .unwrap_err();

        assert!(matches!(err, TrainerError::NoUsableSamples(_)));
    }

    #[tokio::test]
    async fn test_extract_empty_input_is_ok() {
        let vision = StaticVision {
            signals: RawVisionSignals::default(),
        };
        let observations = extract_observations(&FailingFetcher, &vision, Vec::new(), 4)
            .await
            .unwrap();
        assert!(observations.is_empty());
    }

    #[tokio::test]
    async fn test_extract_caps_concurrency() {
        let fetcher = ByteFetcher {
            bytes: png_bytes(64, 36),
        };
        let vision = GaugedVision::new();
        let videos = (0..6).map(|i| video(&format!("v{i}"))).collect();

        extract_observations(&fetcher, &vision, videos, 2)
            .await
            .unwrap();

        assert!(vision.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_extract_truncates_dominant_colors() {
        let colors: Vec<DominantColor> = (0..7)
            .map(|i| DominantColor::new(format!("#0000{i}{i}"), 0.7 - 0.1 * f64::from(i), 0.1))
            .collect();
        let fetcher = ByteFetcher {
            bytes: png_bytes(64, 36),
        };
        let vision = StaticVision {
            signals: RawVisionSignals {
                colors,
                ..RawVisionSignals::default()
            },
        };

        let observations = extract_observations(&fetcher, &vision, vec![video("a")], 4)
            .await
            .unwrap();

        let kept = observations[0].features.dominant_colors.as_ref().unwrap();
        assert_eq!(kept.len(), 5);
        assert_eq!(kept[0].hex, "#000000");
    }
}
