//! Perceptual color aggregation
//!
//! Merges the colors of a quantized image into clusters:
//! - Seeds the cluster set with white and black anchors
//! - Visits colors from most to least frequent
//! - Merges each color into its nearest anchor when closer than the
//!   threshold, otherwise promotes it to a new anchor
//!
//! Visiting by descending frequency lets dominant clusters settle before
//! small ones are compared against them.
//!
//! Algorithm tag: `algo-frequency-ordered-aggregation`

use image::RgbImage;
use log::debug;
use std::collections::HashMap;

use crate::color::{ColorDistance, DistanceCache};
use crate::constants::colors::{BLACK, WHITE};
use crate::preprocess::color_histogram;
use crate::{Color, PaletteError, PixelColor, Result};

/// Mapping from each quantized color to the anchor it was merged into
///
/// Anchors map to themselves. Lives for a single extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalMap {
    inner: HashMap<PixelColor, PixelColor>,
}

impl CanonicalMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, color: PixelColor, canonical: PixelColor) {
        self.inner.insert(color, canonical);
    }

    /// Anchor for `color`, if the color was seen during aggregation
    pub fn resolve(&self, color: PixelColor) -> Option<PixelColor> {
        self.inner.get(&color).copied()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Clusters produced by [`aggregate`]
#[derive(Debug, Clone)]
pub struct Aggregation {
    /// One entry per non-empty anchor, sorted by descending prominence
    pub colors: Vec<Color>,
    /// Quantized color to anchor
    pub canonical: CanonicalMap,
}

/// Cluster the colors of a quantized image
///
/// `min_distance` is a perceptual threshold for `cache`'s metric: a color
/// closer than it to an existing anchor joins that anchor.
///
/// # Errors
///
/// Returns `DegenerateImage` for an image without pixels.
pub fn aggregate<D: ColorDistance>(
    image: &RgbImage,
    min_distance: f64,
    cache: &mut DistanceCache<D>,
) -> Result<Aggregation> {
    let (width, height) = image.dimensions();
    let n_pixels = u64::from(width) * u64::from(height);
    if n_pixels == 0 {
        return Err(PaletteError::DegenerateImage { width, height });
    }

    // Step 1: Exact histogram, most frequent first (stable on first occurrence)
    let mut histogram = color_histogram(image);
    histogram.sort_by(|a, b| b.1.cmp(&a.1));

    // Step 2: Seed anchors
    let mut anchors: Vec<(PixelColor, u64)> = vec![(WHITE, 0), (BLACK, 0)];
    let mut anchor_index: HashMap<PixelColor, usize> = HashMap::from([(WHITE, 0), (BLACK, 1)]);
    let mut canonical = CanonicalMap::new();
    canonical.insert(WHITE, WHITE);
    canonical.insert(BLACK, BLACK);

    // Step 3: Merge or promote each color
    for (color, count) in histogram {
        if let Some(&i) = anchor_index.get(&color) {
            anchors[i].1 += count;
            continue;
        }

        let mut nearest = 0;
        let mut best = f64::INFINITY;
        for (i, (anchor, _)) in anchors.iter().enumerate() {
            let d = cache.distance(color, *anchor);
            if d < best {
                best = d;
                nearest = i;
            }
        }

        if best < min_distance {
            anchors[nearest].1 += count;
            canonical.insert(color, anchors[nearest].0);
        } else {
            anchor_index.insert(color, anchors.len());
            anchors.push((color, count));
            canonical.insert(color, color);
        }
    }

    // Step 4: Prominence of every anchor that received pixels
    let mut colors: Vec<Color> = anchors
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|&(color, count)| Color::new(color, count as f64 / n_pixels as f64))
        .collect();

    // Step 5: Order by prominence; ties keep anchor order
    colors.sort_by(|a, b| b.prominence.total_cmp(&a.prominence));

    let (hits, misses) = cache.stats();
    debug!(
        "aggregated {} pixels into {} clusters ({} anchors, distance cache {}/{} hits)",
        n_pixels,
        colors.len(),
        anchors.len(),
        hits,
        hits + misses
    );

    Ok(Aggregation { colors, canonical })
}
