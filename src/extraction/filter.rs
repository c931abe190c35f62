//! Saturation and prominence filtering
//!
//! Turns the clustered colors into the reported palette: washed-out colors
//! and a washed-out background are dropped, then the list is truncated to
//! colors reasonably prominent next to the top one.

use crate::color::saturation;
use crate::{Color, Palette};

fn meets_min_saturation(color: &Color, threshold: f64) -> bool {
    saturation(color.value) > threshold
}

/// Build the final palette
///
/// `colors` must be sorted by descending prominence; the output keeps that
/// order and is always a prefix of the saturated colors. When no color is
/// saturated enough the single most prominent one is kept, so a non-empty
/// input never yields an empty palette.
pub fn filter_palette(
    colors: Vec<Color>,
    bg: Option<Color>,
    min_saturation: f64,
    min_prominence: f64,
    max_colors: usize,
) -> Palette {
    let bgcolor = bg.filter(|c| meets_min_saturation(c, min_saturation));

    let saturated: Vec<Color> = colors
        .iter()
        .filter(|c| meets_min_saturation(c, min_saturation))
        .copied()
        .collect();
    let retained = if saturated.is_empty() {
        colors.into_iter().take(1).collect()
    } else {
        saturated
    };

    let cutoff = retained.first().map_or(0.0, |top| top.prominence * min_prominence);
    let colors = retained
        .into_iter()
        .take_while(|c| c.prominence >= cutoff)
        .take(max_colors)
        .collect();

    Palette { colors, bgcolor }
}
