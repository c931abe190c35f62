//! Background color detection
//!
//! Decides whether one cluster is the image background, in two tiers:
//! - Majority: the most prominent cluster covers at least the threshold
//! - Edges: enough of eight border samples resolve to the same cluster
//!
//! A palette with a single cluster has no background; that cluster is the
//! image content.

use image::RgbImage;
use log::{debug, error};

use crate::constants::background::EDGE_SAMPLE_COUNT;
use crate::extraction::aggregate::CanonicalMap;
use crate::{Color, PaletteError, PixelColor, Result};

/// Four corners and four edge midpoints of a `width x height` image
///
/// Order: left edge top to bottom, bottom edge, right edge bottom to top,
/// top edge.
pub fn edge_sample_points(width: u32, height: u32) -> [(u32, u32); EDGE_SAMPLE_COUNT] {
    let right = width.saturating_sub(1);
    let bottom = height.saturating_sub(1);
    [
        (0, 0),
        (0, height / 2),
        (0, bottom),
        (width / 2, bottom),
        (right, bottom),
        (right, height / 2),
        (right, 0),
        (width / 2, 0),
    ]
}

/// Anchor with the most edge samples and its sample count
///
/// Ties go to the anchor reached first in sample order.
fn edge_majority(image: &RgbImage, canonical: &CanonicalMap) -> Result<Option<(PixelColor, usize)>> {
    let (width, height) = image.dimensions();
    let mut tally: Vec<(PixelColor, usize)> = Vec::with_capacity(EDGE_SAMPLE_COUNT);

    for (x, y) in edge_sample_points(width, height) {
        let Some(pixel) = image.get_pixel_checked(x, y) else {
            continue;
        };
        let color = PixelColor::from(pixel);
        let anchor = canonical.resolve(color).ok_or_else(|| {
            let reason = format!("edge pixel {} at ({}, {}) has no canonical anchor", color, x, y);
            error!("{}", reason);
            PaletteError::InvariantViolation { reason }
        })?;

        match tally.iter_mut().find(|(c, _)| *c == anchor) {
            Some(entry) => entry.1 += 1,
            None => tally.push((anchor, 1)),
        }
    }

    let mut best: Option<(PixelColor, usize)> = None;
    for &(anchor, count) in &tally {
        if best.map_or(true, |(_, n)| count > n) {
            best = Some((anchor, count));
        }
    }
    Ok(best)
}

/// Split the background cluster, if any, from the palette
///
/// `colors` must be sorted by descending prominence, as produced by
/// aggregation over the same `image` and `canonical` map.
///
/// # Errors
///
/// Returns `InvariantViolation` when an edge sample resolves to an anchor
/// that is not in `colors`; this signals a bug, not bad input.
pub fn detect_background(
    image: &RgbImage,
    mut colors: Vec<Color>,
    canonical: &CanonicalMap,
    background_threshold: f64,
    edge_majority_count: usize,
) -> Result<(Vec<Color>, Option<Color>)> {
    if colors.len() < 2 {
        return Ok((colors, None));
    }

    // Step 1: Majority rule
    if colors[0].prominence >= background_threshold {
        let bg = colors.remove(0);
        debug!("background {} by prominence {:.3}", bg.value, bg.prominence);
        return Ok((colors, Some(bg)));
    }

    // Step 2: Edge sampling
    let Some((anchor, count)) = edge_majority(image, canonical)? else {
        return Ok((colors, None));
    };
    if count < edge_majority_count {
        debug!("no background: best edge anchor {} has {} samples", anchor, count);
        return Ok((colors, None));
    }

    let position = colors.iter().position(|c| c.value == anchor).ok_or_else(|| {
        let reason = format!("edge anchor {} is missing from the aggregated palette", anchor);
        error!("{}", reason);
        PaletteError::InvariantViolation { reason }
    })?;

    let bg = colors.remove(position);
    debug!("background {} by {} of {} edge samples", bg.value, count, EDGE_SAMPLE_COUNT);
    Ok((colors, Some(bg)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const RED: PixelColor = PixelColor::new(220, 20, 20);
    const BLUE: PixelColor = PixelColor::new(20, 20, 220);
    const GREEN: PixelColor = PixelColor::new(20, 200, 20);

    fn identity_map(colors: &[PixelColor]) -> CanonicalMap {
        let mut map = CanonicalMap::new();
        for &c in colors {
            map.insert(c, c);
        }
        map
    }

    #[test]
    fn test_sample_points() {
        let points = edge_sample_points(10, 6);
        assert_eq!(
            points,
            [(0, 0), (0, 3), (0, 5), (5, 5), (9, 5), (9, 3), (9, 0), (5, 0)]
        );
        assert_eq!(edge_sample_points(1, 1), [(0, 0); 8]);
    }

    #[test]
    fn test_majority_rule() {
        let image = RgbImage::from_pixel(4, 4, Rgb::from(RED));
        let colors = vec![Color::new(RED, 0.6), Color::new(BLUE, 0.4)];
        let (rest, bg) =
            detect_background(&image, colors, &identity_map(&[RED, BLUE]), 0.5, 3).unwrap();
        assert_eq!(bg, Some(Color::new(RED, 0.6)));
        assert_eq!(rest, vec![Color::new(BLUE, 0.4)]);
    }

    #[test]
    fn test_single_color_has_no_background() {
        let image = RgbImage::from_pixel(4, 4, Rgb::from(RED));
        let colors = vec![Color::new(RED, 1.0)];
        let (rest, bg) = detect_background(&image, colors, &identity_map(&[RED]), 0.5, 3).unwrap();
        assert_eq!(bg, None);
        assert_eq!(rest, vec![Color::new(RED, 1.0)]);
    }

    #[test]
    fn test_edge_rule_finds_frame_color() {
        // Blue frame covering 36% of a 10x10 image; red and green fill the middle
        let image = RgbImage::from_fn(10, 10, |x, y| {
            if x == 0 || y == 0 || x == 9 || y == 9 {
                Rgb::from(BLUE)
            } else if x < 5 {
                Rgb::from(RED)
            } else {
                Rgb::from(GREEN)
            }
        });
        let colors = vec![
            Color::new(BLUE, 0.36),
            Color::new(RED, 0.32),
            Color::new(GREEN, 0.32),
        ];
        let map = identity_map(&[RED, BLUE, GREEN]);
        let (rest, bg) = detect_background(&image, colors, &map, 0.5, 3).unwrap();
        assert_eq!(bg, Some(Color::new(BLUE, 0.36)));
        assert!(rest.iter().all(|c| c.value != BLUE));
        assert_eq!(rest.len(), 2);
    }

    #[test]
    fn test_edge_rule_uses_canonical_anchor() {
        let near_blue = PixelColor::new(22, 20, 220);
        // Left column blue, right column near-blue: six samples share an anchor
        let image = RgbImage::from_fn(5, 5, |x, _| match x {
            0 => Rgb::from(BLUE),
            4 => Rgb::from(near_blue),
            _ => Rgb::from(RED),
        });
        let mut map = identity_map(&[RED, BLUE]);
        map.insert(near_blue, BLUE);
        let colors = vec![Color::new(RED, 0.6), Color::new(BLUE, 0.4)];

        let (rest, bg) = detect_background(&image, colors, &map, 0.7, 3).unwrap();
        assert_eq!(bg.map(|c| c.value), Some(BLUE));
        assert_eq!(rest, vec![Color::new(RED, 0.6)]);
    }

    #[test]
    fn test_edges_without_majority() {
        // Four colors take two samples each
        let yellow = PixelColor::new(230, 230, 20);
        let cycle = [RED, GREEN, BLUE, yellow];
        let mut image = RgbImage::from_pixel(9, 9, Rgb::from(RED));
        for (i, (x, y)) in edge_sample_points(9, 9).into_iter().enumerate() {
            image.put_pixel(x, y, Rgb::from(cycle[i % 4]));
        }
        let colors = vec![
            Color::new(RED, 0.4),
            Color::new(GREEN, 0.2),
            Color::new(BLUE, 0.2),
            Color::new(yellow, 0.2),
        ];
        let map = identity_map(&[RED, BLUE, GREEN, yellow]);
        let (rest, bg) = detect_background(&image, colors.clone(), &map, 0.5, 3).unwrap();
        assert_eq!(bg, None);
        assert_eq!(rest, colors);
    }

    #[test]
    fn test_missing_anchor_is_invariant_violation() {
        let image = RgbImage::from_pixel(4, 4, Rgb::from(BLUE));
        let colors = vec![Color::new(RED, 0.4), Color::new(GREEN, 0.3)];
        let map = identity_map(&[RED, BLUE, GREEN]);
        let result = detect_background(&image, colors, &map, 0.5, 3);
        assert!(matches!(result, Err(PaletteError::InvariantViolation { .. })));
    }

    #[test]
    fn test_unmapped_edge_pixel_is_invariant_violation() {
        let image = RgbImage::from_pixel(4, 4, Rgb::from(BLUE));
        let colors = vec![Color::new(RED, 0.4), Color::new(GREEN, 0.3)];
        let result = detect_background(&image, colors, &identity_map(&[RED, GREEN]), 0.5, 3);
        assert!(matches!(result, Err(PaletteError::InvariantViolation { .. })));
    }
}
