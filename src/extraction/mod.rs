//! Palette extraction pipeline
//!
//! Runs the per-image stages in order, holding no state between calls:
//! preprocess, aggregate, detect background, filter.

pub mod aggregate;
pub mod background;
pub mod filter;

pub use aggregate::{aggregate, Aggregation, CanonicalMap};
pub use background::{detect_background, edge_sample_points};
pub use filter::filter_palette;

use image::{DynamicImage, RgbImage};
use log::debug;
use std::path::Path;

use crate::color::DistanceCache;
use crate::image_loader::load_image;
use crate::preprocess::preprocess;
use crate::{Palette, PaletteConfig, Result};

/// Detect the palette of an image file
///
/// # Errors
///
/// Returns `PaletteError` if:
/// - The configuration is invalid
/// - The image cannot be opened or decoded
/// - The image has no pixels
pub fn extract_colors(path: &Path, config: &PaletteConfig) -> Result<Palette> {
    config.validate()?;
    let image = load_image(path)?;
    run_pipeline(&image, config)
}

/// Detect the palette of a decoded image
///
/// Non-RGB images are converted first; alpha is ignored.
pub fn extract_colors_from_image(image: &DynamicImage, config: &PaletteConfig) -> Result<Palette> {
    config.validate()?;
    match image {
        DynamicImage::ImageRgb8(rgb) => run_pipeline(rgb, config),
        other => run_pipeline(&other.to_rgb8(), config),
    }
}

/// Detect the palette of an 8-bit RGB pixel grid
pub fn extract_colors_from_rgb(image: &RgbImage, config: &PaletteConfig) -> Result<Palette> {
    config.validate()?;
    run_pipeline(image, config)
}

fn run_pipeline(image: &RgbImage, config: &PaletteConfig) -> Result<Palette> {
    let quantized = preprocess(image, config.crop_background, config.quantize_levels)?;

    let mut cache = DistanceCache::for_levels(config.distance, config.quantize_levels);
    let Aggregation { colors, canonical } = aggregate(&quantized, config.min_distance, &mut cache)?;

    let (colors, bg) = detect_background(
        &quantized,
        colors,
        &canonical,
        config.background_threshold,
        config.edge_majority,
    )?;

    let palette = filter_palette(
        colors,
        bg,
        config.min_saturation,
        config.min_prominence,
        config.max_colors,
    );
    debug!(
        "palette: {} colors, background {}",
        palette.colors.len(),
        palette
            .bgcolor
            .map_or_else(|| "none".to_string(), |c| c.value.to_string())
    );
    Ok(palette)
}
