//! Palette swatch images
//!
//! One square block per palette color, left to right in palette order, each
//! labelled with its hex code. Labels use a small built-in bitmap font so no
//! font files are needed at runtime.

use image::{ImageError, Rgb, RgbImage};
use log::info;
use std::path::{Path, PathBuf};

use crate::color::value;
use crate::constants::swatch::{
    BLOCK_SIZE_PX, DARK_VALUE_THRESHOLD, FILE_SUFFIX, LABEL_OFFSET_PX, LABEL_SCALE,
};
use crate::{rgb_to_hex, Palette, PaletteError, PixelColor, Result};

const GLYPH_WIDTH: u32 = 3;
const GLYPH_HEIGHT: usize = 5;

const LIGHT_TEXT: Rgb<u8> = Rgb([255, 255, 255]);
const LIGHT_TEXT_SHADOW: Rgb<u8> = Rgb([90, 90, 90]);
const DARK_TEXT: Rgb<u8> = Rgb([0, 0, 0]);
const DARK_TEXT_SHADOW: Rgb<u8> = Rgb([230, 230, 230]);

/// 3x5 glyph rows, most significant of the low three bits on the left
fn glyph(c: char) -> Option<[u8; GLYPH_HEIGHT]> {
    let rows = match c {
        '#' => [0b101, 0b111, 0b101, 0b111, 0b101],
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'b' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' => [0b011, 0b100, 0b100, 0b100, 0b011],
        'd' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'f' => [0b111, 0b100, 0b110, 0b100, 0b100],
        _ => return None,
    };
    Some(rows)
}

/// Draw `text` with its top-left corner at (x, y), clipped to the image
fn draw_text(image: &mut RgbImage, x: u32, y: u32, text: &str, color: Rgb<u8>) {
    let advance = (GLYPH_WIDTH + 1) * LABEL_SCALE;
    for (i, c) in text.chars().enumerate() {
        let Some(rows) = glyph(c) else {
            continue;
        };
        let origin_x = x + i as u32 * advance;
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                let px = origin_x + col * LABEL_SCALE;
                let py = y + row as u32 * LABEL_SCALE;
                for dy in 0..LABEL_SCALE {
                    for dx in 0..LABEL_SCALE {
                        if let Some(pixel) = image.get_pixel_mut_checked(px + dx, py + dy) {
                            *pixel = color;
                        }
                    }
                }
            }
        }
    }
}

/// Label colors (text, shadow) readable on `background`
fn label_colors(background: PixelColor) -> (Rgb<u8>, Rgb<u8>) {
    if value(background) < DARK_VALUE_THRESHOLD {
        (LIGHT_TEXT, LIGHT_TEXT_SHADOW)
    } else {
        (DARK_TEXT, DARK_TEXT_SHADOW)
    }
}

/// Render the palette colors as a strip of labelled blocks
///
/// The background color is not drawn. An empty palette yields a zero-width
/// image.
pub fn render_swatch(palette: &Palette) -> RgbImage {
    let width = BLOCK_SIZE_PX * palette.colors.len() as u32;
    let mut image = RgbImage::new(width, BLOCK_SIZE_PX);

    for (i, color) in palette.colors.iter().enumerate() {
        let x0 = i as u32 * BLOCK_SIZE_PX;
        let fill = Rgb::from(color.value);
        for y in 0..BLOCK_SIZE_PX {
            for x in x0..x0 + BLOCK_SIZE_PX {
                image.put_pixel(x, y, fill);
            }
        }

        let label = rgb_to_hex(color.value);
        let (text, shadow) = label_colors(color.value);
        draw_text(&mut image, x0 + LABEL_OFFSET_PX + 1, LABEL_OFFSET_PX + 1, &label, shadow);
        draw_text(&mut image, x0 + LABEL_OFFSET_PX, LABEL_OFFSET_PX, &label, text);
    }

    image
}

/// Swatch path for an input image: `<dir>/<stem>_palette.png`
pub fn swatch_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{}{}", stem, FILE_SUFFIX))
}

/// Render and write the swatch beside `input`, returning the written path
///
/// # Errors
///
/// Returns `InvalidParameter` for an empty palette and `IoError` when the
/// PNG cannot be written.
pub fn save_swatch(input: &Path, palette: &Palette) -> Result<PathBuf> {
    if palette.colors.is_empty() {
        return Err(PaletteError::invalid_parameter("palette", "no colors"));
    }

    let path = swatch_path(input);
    render_swatch(palette).save(&path).map_err(|e| {
        let message = format!("cannot write swatch {}", path.display());
        match e {
            ImageError::IoError(source) => PaletteError::io(message, source),
            other => PaletteError::io(message, std::io::Error::other(other)),
        }
    })?;

    info!("saved palette swatch {}", path.display());
    Ok(path)
}
