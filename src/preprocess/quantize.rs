//! Adaptive color quantization
//!
//! Reduces an image to at most `levels` distinct colors with a weighted
//! median cut in RGB space:
//! - Build an exact color histogram
//! - Repeatedly split the box with the most (pixel weight x color volume)
//!   at the weighted median of its widest channel
//! - Replace every pixel by the weighted mean of its box
//!
//! Images that already have few enough colors pass through unchanged, so
//! exact colors survive for small palettes. The result is deterministic.
//!
//! Algorithm tag: `algo-median-cut-quantization`

use image::{Rgb, RgbImage};
use log::debug;
use std::collections::HashMap;

use crate::PixelColor;

/// Exact histogram of an image
///
/// Entries appear in order of first occurrence (row-major), which gives
/// downstream tie-breaks a stable order.
pub fn color_histogram(image: &RgbImage) -> Vec<(PixelColor, u64)> {
    let mut index: HashMap<PixelColor, usize> = HashMap::new();
    let mut histogram: Vec<(PixelColor, u64)> = Vec::new();

    for pixel in image.pixels() {
        let color = PixelColor::from(pixel);
        match index.get(&color) {
            Some(&i) => histogram[i].1 += 1,
            None => {
                index.insert(color, histogram.len());
                histogram.push((color, 1));
            }
        }
    }

    histogram
}

/// A box of histogram entries for median cut subdivision
#[derive(Debug, Clone)]
struct ColorBox {
    entries: Vec<(PixelColor, u64)>,
}

impl ColorBox {
    fn new(entries: Vec<(PixelColor, u64)>) -> Self {
        Self { entries }
    }

    fn total_weight(&self) -> u64 {
        self.entries.iter().map(|(_, w)| w).sum()
    }

    /// Channel extents as (min, max) per channel
    fn extents(&self) -> [(u8, u8); 3] {
        let mut extents = [(u8::MAX, u8::MIN); 3];
        for (color, _) in &self.entries {
            for (extent, value) in extents.iter_mut().zip(color.channels()) {
                extent.0 = extent.0.min(value);
                extent.1 = extent.1.max(value);
            }
        }
        extents
    }

    /// Width of each channel's range, counting both ends
    fn spans(&self) -> [u32; 3] {
        self.extents().map(|(lo, hi)| u32::from(hi - lo) + 1)
    }

    /// Split priority: heavy boxes with more color spread split first
    fn priority(&self) -> f64 {
        let volume: f64 = self.spans().iter().map(|&s| f64::from(s)).product();
        self.total_weight() as f64 * volume
    }

    /// Weighted mean color, rounded to the nearest channel value
    fn mean(&self) -> PixelColor {
        let total = self.total_weight().max(1) as f64;
        let mut sums = [0.0f64; 3];
        for (color, weight) in &self.entries {
            for (sum, value) in sums.iter_mut().zip(color.channels()) {
                *sum += f64::from(value) * *weight as f64;
            }
        }
        let [r, g, b] = sums.map(|s| (s / total).round().clamp(0.0, 255.0) as u8);
        PixelColor::new(r, g, b)
    }

    /// Split along the widest channel at the weighted median
    fn split(mut self) -> (ColorBox, ColorBox) {
        let spans = self.spans();
        let axis = if spans[0] >= spans[1] && spans[0] >= spans[2] {
            0
        } else if spans[1] >= spans[2] {
            1
        } else {
            2
        };

        self.entries
            .sort_by_key(|(color, _)| (color.channels()[axis], color.channels()));

        let half_weight = self.total_weight() as f64 / 2.0;
        let mut accumulated = 0.0f64;
        let mut split_idx = 1;
        for (i, (_, w)) in self.entries.iter().enumerate() {
            accumulated += *w as f64;
            if accumulated >= half_weight && i + 1 < self.entries.len() {
                split_idx = i + 1;
                break;
            }
        }

        // At least one entry per side
        split_idx = split_idx.clamp(1, self.entries.len() - 1);

        let right = self.entries.split_off(split_idx);
        (ColorBox::new(self.entries), ColorBox::new(right))
    }
}

/// Median cut over a histogram, returning a map from each input color to
/// its palette color
fn median_cut(histogram: Vec<(PixelColor, u64)>, levels: usize) -> HashMap<PixelColor, PixelColor> {
    let mut boxes = vec![ColorBox::new(histogram)];

    while boxes.len() < levels {
        let mut best: Option<(usize, f64)> = None;
        for (i, candidate) in boxes.iter().enumerate() {
            if candidate.entries.len() < 2 {
                continue;
            }
            let priority = candidate.priority();
            if best.map_or(true, |(_, p)| priority > p) {
                best = Some((i, priority));
            }
        }

        let Some((idx, _)) = best else {
            break; // No more splittable boxes
        };

        let (left, right) = boxes.remove(idx).split();
        boxes.insert(idx, right);
        boxes.insert(idx, left);
    }

    let mut mapping = HashMap::new();
    for color_box in &boxes {
        let mean = color_box.mean();
        for (color, _) in &color_box.entries {
            mapping.insert(*color, mean);
        }
    }
    mapping
}

/// Reduce `image` to at most `levels` colors
///
/// Returns a new full-RGB image; `levels` of zero is treated as one.
pub fn quantize(image: &RgbImage, levels: usize) -> RgbImage {
    let levels = levels.max(1);
    let histogram = color_histogram(image);
    if histogram.len() <= levels {
        return image.clone();
    }

    let distinct = histogram.len();
    let mapping = median_cut(histogram, levels);
    debug!("quantized {} distinct colors to at most {}", distinct, levels);

    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        if let Some(mapped) = mapping.get(&PixelColor::from(*pixel)) {
            *pixel = Rgb::from(*mapped);
        }
    }
    out
}
