//! Vision signals extracted from a single thumbnail.
//!
//! `VisionFeatures` is the scoring engine's sole description of a thumbnail:
//! text fragments, dominant colors, detected faces, plus the optional
//! refinement signals (font metrics, brightness, layout, clutter). Instances
//! are assembled by the trainer's extraction pipeline or by any caller that
//! already holds vision annotations.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::color::{contrast_ratio, parse_hex};

/// Reference thumbnail width used when true dimensions are unknown.
pub const REFERENCE_WIDTH: f64 = 1280.0;

/// Reference thumbnail height used when true dimensions are unknown.
pub const REFERENCE_HEIGHT: f64 = 720.0;

/// A single vertex of a face bounding polygon, in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PolyPoint {
    pub x: f64,
    pub y: f64,
}

impl PolyPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Four-corner bounding polygon of a detected face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BoundingPoly {
    /// Corner vertices in detection order.
    pub vertices: Vec<PolyPoint>,
}

impl BoundingPoly {
    pub fn new(vertices: Vec<PolyPoint>) -> Self {
        Self { vertices }
    }

    /// Axis-aligned rectangle convenience constructor.
    pub fn from_rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            vertices: vec![
                PolyPoint::new(x, y),
                PolyPoint::new(x + width, y),
                PolyPoint::new(x + width, y + height),
                PolyPoint::new(x, y + height),
            ],
        }
    }

    /// Polygon area in square pixels (shoelace formula).
    pub fn area(&self) -> f64 {
        let n = self.vertices.len();
        if n < 3 {
            return 0.0;
        }
        let mut sum = 0.0;
        for i in 0..n {
            let a = &self.vertices[i];
            let b = &self.vertices[(i + 1) % n];
            sum += a.x * b.y - b.x * a.y;
        }
        (sum / 2.0).abs()
    }

    /// Face area as a percentage of the image area (0-100).
    ///
    /// When the true image area is unknown the 1280x720 reference stands in,
    /// so percentages from undersized thumbnails read low rather than
    /// erroring out.
    pub fn size_percent(&self, image_area: Option<f64>) -> f64 {
        let reference = match image_area {
            Some(a) if a > 0.0 => a,
            _ => REFERENCE_WIDTH * REFERENCE_HEIGHT,
        };
        (self.area() / reference * 100.0).clamp(0.0, 100.0)
    }
}

/// Facial expression labels recognized by the face scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    Joy,
    Excited,
    Surprise,
    Happy,
    Confused,
    Angry,
    Neutral,
    Sad,
    /// Any label outside the recognized set.
    #[serde(other)]
    Unknown,
}

/// A single detected face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FaceDetection {
    /// Expression labels attributed to this face.
    #[serde(default)]
    pub expressions: Vec<Expression>,

    /// Four-corner bounding polygon in pixel coordinates.
    pub bounding_box: BoundingPoly,

    /// Face area as a percentage of the image area (0-100).
    pub size_percent: f64,

    /// Detection confidence (0.0-1.0).
    pub confidence: f64,
}

impl FaceDetection {
    /// Create a face with an explicit size percentage.
    pub fn new(bounding_box: BoundingPoly, size_percent: f64, confidence: f64) -> Self {
        Self {
            expressions: Vec::new(),
            bounding_box,
            size_percent,
            confidence,
        }
    }

    /// Create a face from its polygon, deriving the size percentage from
    /// the image area (1280x720 reference when `None`).
    pub fn from_poly(bounding_box: BoundingPoly, image_area: Option<f64>, confidence: f64) -> Self {
        let size_percent = bounding_box.size_percent(image_area);
        Self::new(bounding_box, size_percent, confidence)
    }

    /// Add an expression label.
    pub fn with_expression(mut self, expression: Expression) -> Self {
        self.expressions.push(expression);
        self
    }
}

/// Readability of on-image text, derived from aggregate character count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum TextReadability {
    /// No text at all.
    #[default]
    None,
    /// 1-9 characters.
    Minimal,
    /// 10-34 characters.
    Good,
    /// 35 characters or more.
    Excessive,
}

impl TextReadability {
    /// Classify from total character count across all fragments.
    pub fn from_char_count(chars: usize) -> Self {
        match chars {
            0 => Self::None,
            1..=9 => Self::Minimal,
            10..=34 => Self::Good,
            _ => Self::Excessive,
        }
    }
}

/// Contrast between the two most dominant colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContrastLevel {
    Low,
    Medium,
    High,
}

impl ContrastLevel {
    /// Classify a WCAG contrast ratio.
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= 4.5 {
            Self::High
        } else if ratio >= 2.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// How much of the image the detected faces occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FaceProminence {
    High,
    Medium,
    Low,
}

impl FaceProminence {
    /// Classify total face coverage (percent of image area).
    ///
    /// Returns `None` for zero or degenerate coverage; the face scorer
    /// treats that as unknown prominence.
    pub fn from_total_coverage(pct: f64) -> Option<Self> {
        if pct >= 15.0 {
            Some(Self::High)
        } else if pct >= 5.0 {
            Some(Self::Medium)
        } else if pct > 0.0 {
            Some(Self::Low)
        } else {
            None
        }
    }
}

/// Horizontal position of the primary face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FacePosition {
    Left,
    Center,
    Right,
}

/// Detected composition layout of the thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ThumbnailLayout {
    RuleOfThirds,
    GoldenRatio,
    Centered,
    Other,
}

/// One dominant color extracted from a thumbnail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DominantColor {
    /// Hex color, `#RRGGBB`.
    pub hex: String,

    /// Dominance score (0.0-1.0), higher means more prominent.
    pub score: f64,

    /// Fraction of pixels attributed to this color (0.0-1.0).
    pub pixel_fraction: f64,
}

impl DominantColor {
    pub fn new(hex: impl Into<String>, score: f64, pixel_fraction: f64) -> Self {
        Self {
            hex: hex.into(),
            score,
            pixel_fraction,
        }
    }

    /// RGB components, if the hex string parses.
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        parse_hex(&self.hex).ok()
    }
}

/// Aggregate font measurements for on-image text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FontMetrics {
    /// Mean glyph height in pixels.
    pub avg_height_px: f64,

    /// Contrast ratio between text and its background, when measured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast_ratio: Option<f64>,
}

/// Vision signals extracted from a single thumbnail.
///
/// The three core lists are optional at the serde level: a wholly absent
/// list means the upstream detector failed for that signal, and scoring
/// refuses the input rather than inventing a neutral value. An empty list
/// is a legitimate observation (no text, no colors, no faces).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct VisionFeatures {
    /// Distinct text fragments in detection order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_text: Option<Vec<String>>,

    /// Readability bucket derived from aggregate character count.
    #[serde(default)]
    pub text_readability: TextReadability,

    /// Dominant colors ordered by dominance score (at most 5 retained).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dominant_colors: Option<Vec<DominantColor>>,

    /// Contrast between the two most dominant colors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_contrast: Option<ContrastLevel>,

    /// Detected faces.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faces: Option<Vec<FaceDetection>>,

    /// Font measurements, when text glyphs were measured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<FontMetrics>,

    /// Mean brightness (0.0-1.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,

    /// Mean saturation (0.0-1.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturation: Option<f64>,

    /// Detected composition layout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<ThumbnailLayout>,

    /// Visual clutter estimate (0.0 = clean, 1.0 = saturated with elements).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clutter_factor: Option<f64>,

    /// Whether the primary face makes eye contact with the camera.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eye_contact: Option<bool>,

    /// Horizontal position of the primary face.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face_position: Option<FacePosition>,
}

impl VisionFeatures {
    /// Features with all three required lists present but empty.
    ///
    /// `Default` leaves the required lists absent, which the engine rejects;
    /// this is the scoring-ready starting point.
    pub fn empty() -> Self {
        Self {
            detected_text: Some(Vec::new()),
            dominant_colors: Some(Vec::new()),
            faces: Some(Vec::new()),
            ..Self::default()
        }
    }

    /// Set the detected text fragments and derive the readability label.
    pub fn with_detected_text(mut self, fragments: Vec<String>) -> Self {
        let chars: usize = fragments.iter().map(|s| s.chars().count()).sum();
        self.text_readability = TextReadability::from_char_count(chars);
        self.detected_text = Some(fragments);
        self
    }

    /// Set the dominant colors and derive the contrast label from the
    /// two most dominant parseable colors.
    pub fn with_dominant_colors(mut self, colors: Vec<DominantColor>) -> Self {
        self.color_contrast = derive_contrast(&colors);
        self.dominant_colors = Some(colors);
        self
    }

    /// Set the detected faces.
    pub fn with_faces(mut self, faces: Vec<FaceDetection>) -> Self {
        self.faces = Some(faces);
        self
    }

    /// Total characters across all detected text fragments.
    pub fn total_text_chars(&self) -> usize {
        self.detected_text
            .as_deref()
            .map(|frags| frags.iter().map(|s| s.chars().count()).sum())
            .unwrap_or(0)
    }

    /// Combined face coverage as a percentage of the image area.
    pub fn total_face_coverage(&self) -> f64 {
        self.faces
            .as_deref()
            .map(|faces| faces.iter().map(|f| f.size_percent).sum())
            .unwrap_or(0.0)
    }
}

/// Contrast label from the two most dominant parseable colors, if both exist.
pub fn derive_contrast(colors: &[DominantColor]) -> Option<ContrastLevel> {
    let mut rgb = colors.iter().filter_map(|c| c.rgb());
    let a = rgb.next()?;
    let b = rgb.next()?;
    Some(ContrastLevel::from_ratio(contrast_ratio(a, b)))
}
