//! Renderings of a detected palette
//!
//! - `text`: one tab-separated line per image for stream output
//! - `swatch`: a PNG strip of labelled color blocks

pub mod swatch;
pub mod text;

pub use swatch::{render_swatch, save_swatch, swatch_path};
pub use text::format_palette_line;
