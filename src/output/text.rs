//! Tab-separated palette lines

use crate::{rgb_to_hex, Palette};

/// Render `name<TAB>hex,hex,...<TAB>background`
///
/// The background field is empty when no background was detected.
pub fn format_palette_line(name: &str, palette: &Palette) -> String {
    let colors: Vec<String> = palette.colors.iter().map(|c| rgb_to_hex(c.value)).collect();
    let bg = palette
        .bgcolor
        .map(|c| rgb_to_hex(c.value))
        .unwrap_or_default();
    format!("{}\t{}\t{}", name, colors.join(","), bg)
}
