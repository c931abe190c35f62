//! Image preprocessing module
//!
//! Prepares a decoded image for clustering: crops away a uniform border and
//! reduces the color depth with an adaptive palette.

pub mod crop;
pub mod quantize;

pub use crop::{autocrop, content_bounds, CropBox};
pub use quantize::{color_histogram, quantize};

use image::RgbImage;
use log::debug;

use crate::{PaletteError, PixelColor, Result};

/// Crop and quantize an image
///
/// The input is not modified. `background` is the border color removed by
/// [`autocrop`]; `quantize_levels` bounds the number of distinct colors in
/// the result.
///
/// # Errors
///
/// Returns `DegenerateImage` if the image has no pixels.
pub fn preprocess(image: &RgbImage, background: PixelColor, quantize_levels: usize) -> Result<RgbImage> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(PaletteError::DegenerateImage { width, height });
    }

    let cropped = autocrop(image, background);
    let quantized = quantize(&cropped, quantize_levels);
    debug!(
        "preprocessed {}x{} -> {}x{} at {} levels",
        width,
        height,
        quantized.width(),
        quantized.height(),
        quantize_levels
    );
    Ok(quantized)
}
