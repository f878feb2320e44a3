use crate::utils::error::{MoodboardError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// An sRGB triple. Serialized as its `#rrggbb` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Parses `#rrggbb` or `rrggbb`, in either case.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(MoodboardError::validation(format!(
                "'{}' is not a #rrggbb color",
                hex
            )));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|e| MoodboardError::validation(format!("'{}': {}", hex, e)))
        };

        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    pub fn rgb(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Perceptual luminance in [0, 1].
    pub fn luminance(&self) -> f64 {
        (0.299 * f64::from(self.r) + 0.587 * f64::from(self.g) + 0.114 * f64::from(self.b))
            / 255.0
    }

    pub fn channel_average(&self) -> f64 {
        (f64::from(self.r) + f64::from(self.g) + f64::from(self.b)) / 3.0
    }

    /// Black or white, whichever reads better on top of this color.
    pub fn contrast_color(&self) -> Color {
        if self.luminance() > 0.5 {
            Color::BLACK
        } else {
            Color::WHITE
        }
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Color::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

/// Colors sampled from a single image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampledColors {
    pub dominant: Color,
    pub palette: Vec<Color>,
}

impl SampledColors {
    /// Dominant first, then the palette entries.
    pub fn colors(&self) -> impl Iterator<Item = Color> + '_ {
        std::iter::once(self.dominant).chain(self.palette.iter().copied())
    }
}

/// The palette stored on a moodboard.
///
/// On disk this is `{ "dominant": "#..", "palette": ["#.."], "rgb": [[r,g,b]] }`;
/// `rgb` mirrors `palette` and is regenerated on every write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "PaletteRecord", from = "PaletteRecord")]
pub struct ColorPalette {
    pub dominant: Color,
    pub palette: Vec<Color>,
}

impl ColorPalette {
    pub fn empty() -> Self {
        Self {
            dominant: Color::BLACK,
            palette: Vec::new(),
        }
    }

    pub fn hex_values(&self) -> Vec<String> {
        self.palette.iter().map(Color::to_hex).collect()
    }
}

#[derive(Serialize, Deserialize)]
struct PaletteRecord {
    dominant: Color,
    palette: Vec<Color>,
    #[serde(default)]
    rgb: Vec<[u8; 3]>,
}

impl From<ColorPalette> for PaletteRecord {
    fn from(palette: ColorPalette) -> Self {
        let rgb = palette.palette.iter().map(Color::rgb).collect();
        Self {
            dominant: palette.dominant,
            palette: palette.palette,
            rgb,
        }
    }
}

impl From<PaletteRecord> for ColorPalette {
    fn from(record: PaletteRecord) -> Self {
        Self {
            dominant: record.dominant,
            palette: record.palette,
        }
    }
}

/// A reference to one generated image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub id: String,
    /// `data:` URL for inline images, otherwise an http(s) URL or a file path.
    pub url: String,
    /// Raw base64 payload; empty when the image lives elsewhere.
    #[serde(default)]
    pub base64: String,
}

impl GeneratedImage {
    pub fn from_base64(id: impl Into<String>, base64: impl Into<String>) -> Self {
        let base64 = base64.into();
        Self {
            id: id.into(),
            url: format!("data:image/png;base64,{}", base64),
            base64,
        }
    }

    pub fn from_url(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            base64: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Moodboard {
    pub id: String,
    pub prompt: String,
    pub images: Vec<GeneratedImage>,
    pub palette: ColorPalette,
    pub keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub prompt: String,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_is_lowercase_and_zero_padded() {
        assert_eq!(Color::new(0, 10, 255).to_hex(), "#000aff");
        assert_eq!(Color::new(139, 90, 43).to_hex(), "#8b5a2b");
    }

    #[test]
    fn test_from_hex_accepts_case_and_missing_hash() {
        assert_eq!(Color::from_hex("#8B5A2B").unwrap(), Color::new(139, 90, 43));
        assert_eq!(Color::from_hex("8b5a2b").unwrap(), Color::new(139, 90, 43));
        assert!(Color::from_hex("#8b5a2").is_err());
        assert!(Color::from_hex("#zzzzzz").is_err());
        assert!(Color::from_hex("#+1+1+1").is_err());
    }

    #[test]
    fn test_contrast_color() {
        assert_eq!(Color::WHITE.contrast_color(), Color::BLACK);
        assert_eq!(Color::new(20, 20, 60).contrast_color(), Color::WHITE);
    }

    #[test]
    fn test_palette_serializes_with_rgb_mirror() {
        let palette = ColorPalette {
            dominant: Color::new(139, 90, 43),
            palette: vec![Color::new(139, 90, 43), Color::new(255, 255, 255)],
        };

        let json = serde_json::to_value(&palette).unwrap();
        assert_eq!(json["dominant"], "#8b5a2b");
        assert_eq!(json["palette"], serde_json::json!(["#8b5a2b", "#ffffff"]));
        assert_eq!(
            json["rgb"],
            serde_json::json!([[139, 90, 43], [255, 255, 255]])
        );

        let back: ColorPalette = serde_json::from_value(json).unwrap();
        assert_eq!(back, palette);
    }

    #[test]
    fn test_moodboard_uses_camel_case_timestamp() {
        let moodboard = Moodboard {
            id: "m1".to_string(),
            prompt: "dreamy pastel clouds".to_string(),
            images: vec![GeneratedImage::from_url("image-0", "https://example.com/a.png")],
            palette: ColorPalette::empty(),
            keywords: vec!["dreamy".to_string()],
            created_at: "2024-05-01T12:00:00.000Z".parse().unwrap(),
        };

        let json = serde_json::to_value(&moodboard).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("created_at").is_none());

        let back: Moodboard = serde_json::from_value(json).unwrap();
        assert_eq!(back, moodboard);
    }
}
