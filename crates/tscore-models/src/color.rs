//! Color math shared by the trainer and the scoring engine.
//!
//! Hex parsing, WCAG relative luminance and contrast ratio, HSV saturation,
//! and the coarse color-range buckets used by the findings statistics.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error parsing a hex color string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorParseError {
    /// The string is not a `#RRGGBB` color.
    #[error("invalid hex color: {0}")]
    InvalidHex(String),
}

pub type ColorResult<T> = Result<T, ColorParseError>;

/// Coarse color bucket used for corpus frequency statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ColorRange {
    White,
    Black,
    Red,
    Green,
    Blue,
    Yellow,
    Other,
}

impl ColorRange {
    /// Classify an RGB triple into its coarse range.
    ///
    /// Yellow is checked before the single-channel rules so strong
    /// red+green mixes do not fall through to `Other`.
    pub fn classify(r: u8, g: u8, b: u8) -> Self {
        if r >= 200 && g >= 200 && b >= 200 {
            return Self::White;
        }
        if r <= 50 && g <= 50 && b <= 50 {
            return Self::Black;
        }
        if r >= 150 && g >= 150 && b <= 100 {
            return Self::Yellow;
        }
        let (rf, gf, bf) = (r as f64, g as f64, b as f64);
        if r >= 150 && rf >= 1.5 * gf && rf >= 1.5 * bf {
            return Self::Red;
        }
        if g >= 150 && gf >= 1.5 * rf && gf >= 1.5 * bf {
            return Self::Green;
        }
        if b >= 150 && bf >= 1.5 * rf && bf >= 1.5 * gf {
            return Self::Blue;
        }
        Self::Other
    }

    /// Classify a `#RRGGBB` hex string.
    pub fn classify_hex(hex: &str) -> ColorResult<Self> {
        let (r, g, b) = parse_hex(hex)?;
        Ok(Self::classify(r, g, b))
    }
}

/// Parse a `#RRGGBB` (or bare `RRGGBB`) hex color into RGB components.
pub fn parse_hex(hex: &str) -> ColorResult<(u8, u8, u8)> {
    let raw = hex.trim().trim_start_matches('#');
    if raw.len() != 6 || !raw.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ColorParseError::InvalidHex(hex.to_string()));
    }
    let parse = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&raw[range], 16)
            .map_err(|_| ColorParseError::InvalidHex(hex.to_string()))
    };
    Ok((parse(0..2)?, parse(2..4)?, parse(4..6)?))
}

/// WCAG relative luminance of an RGB color (0.0-1.0).
pub fn relative_luminance(r: u8, g: u8, b: u8) -> f64 {
    fn channel(c: u8) -> f64 {
        let c = c as f64 / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    }
    0.2126 * channel(r) + 0.7152 * channel(g) + 0.0722 * channel(b)
}

/// WCAG contrast ratio between two colors (1.0-21.0).
pub fn contrast_ratio(a: (u8, u8, u8), b: (u8, u8, u8)) -> f64 {
    let la = relative_luminance(a.0, a.1, a.2);
    let lb = relative_luminance(b.0, b.1, b.2);
    let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };
    (lighter + 0.05) / (darker + 0.05)
}

/// HSV saturation of an RGB color (0.0-1.0).
pub fn saturation(r: u8, g: u8, b: u8) -> f64 {
    let max = r.max(g).max(b) as f64 / 255.0;
    let min = r.min(g).min(b) as f64 / 255.0;
    if max <= 0.0 {
        0.0
    } else {
        (max - min) / max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#FF8000"), Ok((255, 128, 0)));
        assert_eq!(parse_hex("ff8000"), Ok((255, 128, 0)));
        assert!(parse_hex("#FF80").is_err());
        assert!(parse_hex("#GG0000").is_err());
        assert!(parse_hex("").is_err());
    }

    #[test]
    fn test_classify_ranges() {
        assert_eq!(ColorRange::classify(255, 255, 255), ColorRange::White);
        assert_eq!(ColorRange::classify(10, 10, 10), ColorRange::Black);
        assert_eq!(ColorRange::classify(230, 40, 30), ColorRange::Red);
        assert_eq!(ColorRange::classify(30, 200, 40), ColorRange::Green);
        assert_eq!(ColorRange::classify(20, 60, 220), ColorRange::Blue);
        assert_eq!(ColorRange::classify(240, 220, 40), ColorRange::Yellow);
        // Muted mid-tones land in Other
        assert_eq!(ColorRange::classify(120, 110, 100), ColorRange::Other);
    }

    #[test]
    fn test_yellow_checked_before_red() {
        // A strong red+green mix must classify as yellow, not fall to Other
        assert_eq!(ColorRange::classify(200, 180, 50), ColorRange::Yellow);
    }

    #[test]
    fn test_contrast_ratio_extremes() {
        let ratio = contrast_ratio((255, 255, 255), (0, 0, 0));
        assert!((ratio - 21.0).abs() < 0.01, "black/white ratio should be 21, got {ratio}");
        let same = contrast_ratio((128, 128, 128), (128, 128, 128));
        assert!((same - 1.0).abs() < 1e-9, "identical colors should ratio 1.0");
    }

    #[test]
    fn test_contrast_ratio_symmetric() {
        let a = (255, 0, 0);
        let b = (0, 0, 255);
        assert_eq!(contrast_ratio(a, b), contrast_ratio(b, a));
    }

    #[test]
    fn test_saturation() {
        assert_eq!(saturation(0, 0, 0), 0.0);
        assert_eq!(saturation(128, 128, 128), 0.0);
        assert_eq!(saturation(255, 0, 0), 1.0);
        let mid = saturation(200, 100, 100);
        assert!(mid > 0.0 && mid < 1.0);
    }

    #[test]
    fn test_color_range_serde() {
        let json = serde_json::to_string(&ColorRange::Yellow).unwrap();
        assert_eq!(json, "\"yellow\"");
        let back: ColorRange = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ColorRange::Yellow);
    }
}
