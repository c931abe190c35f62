//! # Colorific
//!
//! Detect a small, human-meaningful palette in an image: a short ranked list
//! of dominant colors plus an optional background color.
//!
//! Extraction runs as a fixed pipeline per image:
//! - Crop away a uniform border and reduce the image to an adaptive palette
//! - Merge quantized colors into clusters by perceptual distance
//! - Detect a background color by prominence or by sampling the edges
//! - Drop washed-out and insignificant colors, capping the palette size
//!
//! ## Example
//!
//! ```rust,no_run
//! use colorific::{extract_colors, rgb_to_hex, PaletteConfig};
//! use std::path::Path;
//!
//! let palette = extract_colors(Path::new("photo.jpg"), &PaletteConfig::default())?;
//! for color in &palette.colors {
//!     println!("{} {:.3}", rgb_to_hex(color.value), color.prominence);
//! }
//! # Ok::<(), colorific::PaletteError>(())
//! ```

use image::Rgb;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod error;
pub mod constants;
pub mod config;
pub mod image_loader;
pub mod color;
pub mod preprocess;
pub mod extraction;
pub mod output;
pub mod batch;

pub use batch::{run_files, run_stream, BatchSummary};
pub use color::{hex_to_rgb, rgb_to_hex, ColorDistance, DistanceMetric};
pub use config::{BatchConfig, PaletteConfig};
pub use error::{PaletteError, Result};
pub use extraction::{extract_colors, extract_colors_from_image, extract_colors_from_rgb};

/// An sRGB triple with 8 bits per channel
///
/// Serializes as a `#rrggbb` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PixelColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl PixelColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels as an array, red first
    pub const fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<Rgb<u8>> for PixelColor {
    fn from(pixel: Rgb<u8>) -> Self {
        let [r, g, b] = pixel.0;
        Self { r, g, b }
    }
}

impl From<&Rgb<u8>> for PixelColor {
    fn from(pixel: &Rgb<u8>) -> Self {
        Self::from(*pixel)
    }
}

impl From<PixelColor> for Rgb<u8> {
    fn from(color: PixelColor) -> Self {
        Rgb(color.channels())
    }
}

impl TryFrom<String> for PixelColor {
    type Error = PaletteError;

    fn try_from(value: String) -> Result<Self> {
        hex_to_rgb(&value)
    }
}

impl From<PixelColor> for String {
    fn from(color: PixelColor) -> Self {
        rgb_to_hex(color)
    }
}

impl fmt::Display for PixelColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&rgb_to_hex(*self))
    }
}

/// A palette entry: a color and the fraction of the image it covers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Representative color of the cluster
    pub value: PixelColor,
    /// Fraction of (cropped) image pixels assigned to the cluster, in (0, 1]
    pub prominence: f64,
}

impl Color {
    pub fn new(value: PixelColor, prominence: f64) -> Self {
        Self { value, prominence }
    }
}

/// Result of palette detection
///
/// `colors` is sorted by descending prominence and never contains the
/// background color's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub colors: Vec<Color>,
    pub bgcolor: Option<Color>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_serialization() {
        let palette = Palette {
            colors: vec![
                Color::new(PixelColor::new(41, 171, 225), 0.9),
                Color::new(PixelColor::new(255, 0, 0), 0.1),
            ],
            bgcolor: Some(Color::new(PixelColor::new(255, 255, 255), 0.6)),
        };

        let json = serde_json::to_string(&palette).unwrap();
        assert!(json.contains("\"#29abe1\""));

        let deserialized: Palette = serde_json::from_str(&json).unwrap();
        assert_eq!(palette, deserialized);
    }

    #[test]
    fn test_pixel_color_rejects_bad_hex() {
        let result: std::result::Result<PixelColor, _> = serde_json::from_str("\"#12345\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_pixel_color_from_rgb() {
        let color = PixelColor::from(Rgb([1, 2, 3]));
        assert_eq!(color, PixelColor::new(1, 2, 3));
        assert_eq!(Rgb::<u8>::from(color), Rgb([1, 2, 3]));
        assert_eq!(color.to_string(), "#010203");
    }
}
