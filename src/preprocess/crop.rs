//! Uniform border removal
//!
//! Finds the bounding box of every pixel that differs from a background color
//! and crops to it. A fully uniform image is returned whole; cropping never
//! produces an empty image.

use image::{imageops, RgbImage};
use log::debug;

use crate::PixelColor;

/// Axis-aligned region of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropBox {
    /// Whether the box spans the whole `width x height` image
    pub fn covers(&self, width: u32, height: u32) -> bool {
        self.x == 0 && self.y == 0 && self.width == width && self.height == height
    }
}

/// Bounding box of all pixels not equal to `background`
///
/// Returns `None` when every pixel matches (including empty images).
pub fn content_bounds(image: &RgbImage, background: PixelColor) -> Option<CropBox> {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut found = false;

    for (x, y, pixel) in image.enumerate_pixels() {
        if PixelColor::from(pixel) != background {
            found = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    found.then(|| CropBox {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

/// Crop away a border of the given background color
pub fn autocrop(image: &RgbImage, background: PixelColor) -> RgbImage {
    let (width, height) = image.dimensions();
    match content_bounds(image, background) {
        Some(bounds) if !bounds.covers(width, height) => {
            debug!("autocrop {}x{} -> {:?}", width, height, bounds);
            imageops::crop_imm(image, bounds.x, bounds.y, bounds.width, bounds.height).to_image()
        }
        // Nothing to remove, or no contents at all: don't crop to nothing
        _ => image.clone(),
    }
}
