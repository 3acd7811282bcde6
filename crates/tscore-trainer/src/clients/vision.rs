//! Image annotation client backed by the Google Cloud Vision API.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use tscore_models::{BoundingPoly, DominantColor, Expression, PolyPoint};

use crate::clients::{env_retries, env_timeout, with_retry, RawFaceSignal, RawVisionSignals, VisionAnalyzer};
use crate::error::{TrainerError, TrainerResult};

/// Max annotations requested per feature.
const MAX_FEATURE_RESULTS: u32 = 20;

/// Configuration for the vision client.
#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// Base URL of the annotation API.
    pub base_url: String,
    /// API key.
    pub api_key: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Max retries.
    pub max_retries: u32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://vision.googleapis.com/v1".to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(60),
            max_retries: 2,
        }
    }
}

impl VisionConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("VISION_API_URL")
                .unwrap_or_else(|_| "https://vision.googleapis.com/v1".to_string()),
            api_key: std::env::var("VISION_API_KEY").unwrap_or_default(),
            timeout: env_timeout("VISION_API_TIMEOUT_SECS", 60),
            max_retries: env_retries("VISION_API_RETRIES", 2),
        }
    }
}

/// Annotation client extracting text, face, color, and object signals
/// from thumbnail bytes.
pub struct HttpVisionClient {
    http: Client,
    config: VisionConfig,
}

impl HttpVisionClient {
    /// Create a new vision client.
    pub fn new(config: VisionConfig) -> TrainerResult<Self> {
        if config.api_key.is_empty() {
            return Err(TrainerError::config("VISION_API_KEY not set"));
        }
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TrainerError::vision_failed(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> TrainerResult<Self> {
        Self::new(VisionConfig::from_env())
    }

    async fn annotate(&self, image: &[u8]) -> TrainerResult<AnnotateResult> {
        let url = format!(
            "{}/images:annotate?key={}",
            self.config.base_url, self.config.api_key
        );

        let request = AnnotateRequest {
            requests: vec![ImageRequest {
                image: ImageContent {
                    content: BASE64.encode(image),
                },
                features: vec![
                    Feature::new("TEXT_DETECTION"),
                    Feature::new("FACE_DETECTION"),
                    Feature::new("IMAGE_PROPERTIES"),
                    Feature::new("OBJECT_LOCALIZATION"),
                ],
            }],
        };

        debug!(bytes = image.len(), "Annotating thumbnail");

        let response = with_retry(self.config.max_retries, || async {
            self.http
                .post(&url)
                .json(&request)
                .send()
                .await
                .map_err(|e| TrainerError::vision_failed(e.to_string()))
        })
        .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TrainerError::vision_failed(format!(
                "annotation returned {}: {}",
                status, body
            )));
        }

        let mut decoded = response
            .json::<AnnotateResponse>()
            .await
            .map_err(|e| TrainerError::vision_failed(format!("decoding annotations: {e}")))?;

        if decoded.responses.is_empty() {
            return Err(TrainerError::vision_failed("empty annotate response"));
        }
        let result = decoded.responses.remove(0);
        if let Some(status) = result.error {
            return Err(TrainerError::vision_failed(status.message));
        }
        Ok(result)
    }
}

impl VisionAnalyzer for HttpVisionClient {
    async fn analyze(&self, image: &[u8]) -> TrainerResult<RawVisionSignals> {
        let result = self.annotate(image).await?;
        Ok(map_annotations(result))
    }
}

#[derive(Debug, Serialize)]
struct AnnotateRequest {
    requests: Vec<ImageRequest>,
}

#[derive(Debug, Serialize)]
struct ImageRequest {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Debug, Serialize)]
struct Feature {
    #[serde(rename = "type")]
    feature_type: String,
    #[serde(rename = "maxResults")]
    max_results: u32,
}

impl Feature {
    fn new(feature_type: &str) -> Self {
        Self {
            feature_type: feature_type.to_string(),
            max_results: MAX_FEATURE_RESULTS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateResult>,
}

#[derive(Debug, Default, Deserialize)]
struct AnnotateResult {
    #[serde(rename = "textAnnotations", default)]
    text_annotations: Vec<TextAnnotation>,
    #[serde(rename = "faceAnnotations", default)]
    face_annotations: Vec<FaceAnnotation>,
    #[serde(rename = "imagePropertiesAnnotation")]
    image_properties: Option<ImageProperties>,
    #[serde(rename = "localizedObjectAnnotations", default)]
    object_annotations: Vec<ObjectAnnotation>,
    error: Option<ApiStatus>,
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct TextAnnotation {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct FaceAnnotation {
    #[serde(rename = "boundingPoly", default)]
    bounding_poly: Poly,
    #[serde(rename = "detectionConfidence", default)]
    detection_confidence: f64,
    #[serde(rename = "joyLikelihood", default)]
    joy_likelihood: String,
    #[serde(rename = "surpriseLikelihood", default)]
    surprise_likelihood: String,
    #[serde(rename = "angerLikelihood", default)]
    anger_likelihood: String,
    #[serde(rename = "sorrowLikelihood", default)]
    sorrow_likelihood: String,
}

impl FaceAnnotation {
    /// Expressions whose likelihood reaches at least POSSIBLE. A face
    /// with nothing detected reads as neutral.
    fn expressions(&self) -> Vec<Expression> {
        let mut expressions = Vec::new();
        if likelihood_present(&self.joy_likelihood) {
            expressions.push(Expression::Joy);
        }
        if likelihood_present(&self.surprise_likelihood) {
            expressions.push(Expression::Surprise);
        }
        if likelihood_present(&self.anger_likelihood) {
            expressions.push(Expression::Angry);
        }
        if likelihood_present(&self.sorrow_likelihood) {
            expressions.push(Expression::Sad);
        }
        if expressions.is_empty() {
            expressions.push(Expression::Neutral);
        }
        expressions
    }
}

#[derive(Debug, Default, Deserialize)]
struct Poly {
    #[serde(default)]
    vertices: Vec<Vertex>,
}

/// The API omits zero-valued coordinates entirely.
#[derive(Debug, Default, Deserialize)]
struct Vertex {
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
}

#[derive(Debug, Deserialize)]
struct ImageProperties {
    #[serde(rename = "dominantColors")]
    dominant_colors: Option<DominantColorsAnnotation>,
}

#[derive(Debug, Deserialize)]
struct DominantColorsAnnotation {
    #[serde(default)]
    colors: Vec<ColorInfo>,
}

#[derive(Debug, Deserialize)]
struct ColorInfo {
    #[serde(default)]
    color: RgbColor,
    #[serde(default)]
    score: f64,
    #[serde(rename = "pixelFraction", default)]
    pixel_fraction: f64,
}

#[derive(Debug, Default, Deserialize)]
struct RgbColor {
    #[serde(default)]
    red: f64,
    #[serde(default)]
    green: f64,
    #[serde(default)]
    blue: f64,
}

impl RgbColor {
    fn to_hex(&self) -> String {
        format!(
            "#{:02X}{:02X}{:02X}",
            channel(self.red),
            channel(self.green),
            channel(self.blue)
        )
    }
}

fn channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

#[derive(Debug, Deserialize)]
struct ObjectAnnotation {
    #[serde(default)]
    name: String,
}

fn likelihood_present(likelihood: &str) -> bool {
    matches!(likelihood, "POSSIBLE" | "LIKELY" | "VERY_LIKELY")
}

fn map_annotations(result: AnnotateResult) -> RawVisionSignals {
    // The first text annotation aggregates the whole image; individual
    // fragments follow it.
    let text_fragments: Vec<String> = if result.text_annotations.len() > 1 {
        result
            .text_annotations
            .into_iter()
            .skip(1)
            .map(|t| t.description)
            .collect()
    } else {
        result
            .text_annotations
            .into_iter()
            .map(|t| t.description)
            .collect()
    };

    let faces = result
        .face_annotations
        .into_iter()
        .map(|face| {
            let expressions = face.expressions();
            let vertices = face
                .bounding_poly
                .vertices
                .into_iter()
                .map(|v| PolyPoint { x: v.x, y: v.y })
                .collect();
            RawFaceSignal {
                bounding: BoundingPoly { vertices },
                confidence: face.detection_confidence,
                expressions,
            }
        })
        .collect();

    let mut colors: Vec<DominantColor> = result
        .image_properties
        .and_then(|p| p.dominant_colors)
        .map(|d| d.colors)
        .unwrap_or_default()
        .into_iter()
        .map(|info| DominantColor {
            hex: info.color.to_hex(),
            score: info.score,
            pixel_fraction: info.pixel_fraction,
        })
        .collect();
    colors.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    let object_labels = result
        .object_annotations
        .into_iter()
        .map(|o| o.name)
        .collect();

    RawVisionSignals {
        text_fragments,
        faces,
        colors,
        object_labels,
    }
}
