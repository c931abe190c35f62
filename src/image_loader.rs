//! Image loading
//!
//! Decodes any format the `image` crate was built with and normalizes it to
//! 8-bit RGB. Alpha is discarded and palette or grayscale images are
//! expanded, so downstream code only ever sees concrete RGB triples.
//!
//! The format is guessed from the file contents first and the extension
//! second, so misnamed files still decode.

use image::{DynamicImage, ImageReader, RgbImage};
use log::debug;
use std::io::Cursor;
use std::path::Path;

use crate::error::{PaletteError, Result};

/// Load an image from disk as 8-bit RGB
///
/// # Errors
///
/// Returns `PaletteError::DecodeError` if:
/// - File cannot be opened
/// - Format is not recognized
/// - Decoding fails
///
/// # Example
///
/// ```rust,no_run
/// use colorific::image_loader::load_image;
/// use std::path::Path;
///
/// let image = load_image(Path::new("photo.jpg"))?;
/// println!("Loaded image: {}x{}", image.width(), image.height());
/// # Ok::<(), colorific::PaletteError>(())
/// ```
pub fn load_image(path: &Path) -> Result<RgbImage> {
    let reader = ImageReader::open(path)
        .map_err(|e| PaletteError::decode(format!("Failed to open image file: {}", path.display()), e))?
        .with_guessed_format()
        .map_err(|e| PaletteError::decode(format!("Failed to read image file: {}", path.display()), e))?;

    let format = reader.format();
    let image = reader
        .decode()
        .map_err(|e| PaletteError::decode(format!("Failed to decode image: {}", path.display()), e))?;

    debug!(
        "decoded {} as {:?} ({}x{}, {:?})",
        path.display(),
        format,
        image.width(),
        image.height(),
        image.color()
    );
    Ok(to_rgb(image))
}

/// Decode an in-memory encoded image as 8-bit RGB
pub fn load_image_from_memory(bytes: &[u8]) -> Result<RgbImage> {
    let image = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| PaletteError::decode("Failed to read image bytes", e))?
        .decode()
        .map_err(|e| PaletteError::decode("Failed to decode image bytes", e))?;
    Ok(to_rgb(image))
}

/// Convert any decoded image to 8-bit RGB, reusing the buffer when possible
pub fn to_rgb(image: DynamicImage) -> RgbImage {
    match image {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other => other.to_rgb8(),
    }
}
