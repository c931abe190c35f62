//! Color representation conversions
//!
//! Provides conversions used throughout extraction:
//! - 8-bit RGB to and from `#rrggbb` hex strings
//! - sRGB to CIE Lab (D65) for perceptual distance
//! - sRGB to HSV for saturation and brightness filtering

use palette::encoding::Srgb as SrgbStandard;
use palette::white_point::D65;
use palette::{FromColor, Hsv, Lab, Srgb};

use crate::{PaletteError, PixelColor, Result};

/// Convert a color to its hexadecimal representation
///
/// Always lowercase with two zero-padded digits per channel, e.g. `#0a0b0c`.
pub fn rgb_to_hex(color: PixelColor) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

/// Parse a `#rrggbb` hexadecimal color
///
/// # Errors
///
/// Returns `ColorConversionError` unless the input is a `#` followed by
/// exactly six hex digits.
pub fn hex_to_rgb(hex: &str) -> Result<PixelColor> {
    let digits = hex.strip_prefix('#').ok_or_else(|| PaletteError::ColorConversionError {
        message: format!("Invalid hex color '{}': missing leading '#'", hex),
    })?;

    if digits.len() != 6 || !digits.is_ascii() {
        return Err(PaletteError::ColorConversionError {
            message: format!("Invalid hex color '{}': expected 6 hex digits", hex),
        });
    }

    let channel = |range: std::ops::Range<usize>, name: &str| {
        u8::from_str_radix(&digits[range], 16).map_err(|e| PaletteError::ColorConversionError {
            message: format!("Invalid {} value in '{}': {}", name, hex, e),
        })
    };

    Ok(PixelColor::new(
        channel(0..2, "red")?,
        channel(2..4, "green")?,
        channel(4..6, "blue")?,
    ))
}

fn to_srgb(color: PixelColor) -> Srgb<f64> {
    Srgb::new(
        f64::from(color.r) / 255.0,
        f64::from(color.g) / 255.0,
        f64::from(color.b) / 255.0,
    )
}

/// Convert 8-bit RGB to CIE Lab under D65
pub fn rgb_to_lab(color: PixelColor) -> Lab<D65, f64> {
    Lab::from_color(to_srgb(color))
}

/// Convert 8-bit RGB to HSV
pub fn rgb_to_hsv(color: PixelColor) -> Hsv<SrgbStandard, f64> {
    Hsv::from_color(to_srgb(color))
}

/// HSV saturation in [0, 1]; zero for black and all grays
pub fn saturation(color: PixelColor) -> f64 {
    rgb_to_hsv(color).saturation
}

/// HSV value (brightness) in [0, 1]
pub fn value(color: PixelColor) -> f64 {
    rgb_to_hsv(color).value
}
