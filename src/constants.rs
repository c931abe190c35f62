//! Tuning constants and reference values for palette detection
//!
//! These are the defaults behind [`crate::PaletteConfig`] and
//! [`crate::BatchConfig`]. Nothing here is mutable; callers that need other
//! values build a config instead.

use crate::PixelColor;

/// Fixed anchor colors
pub mod colors {
    use super::PixelColor;

    /// Pure white, the default crop background and the first anchor
    pub const WHITE: PixelColor = PixelColor::new(255, 255, 255);

    /// Pure black, the second anchor
    pub const BLACK: PixelColor = PixelColor::new(0, 0, 0);
}

/// Default extraction parameters
pub mod defaults {
    /// Size of the adaptive palette before clustering
    pub const QUANTIZE_LEVELS: usize = 100;

    /// Perceptual distance below which two colors merge
    pub const MIN_DISTANCE: f64 = 10.0;

    /// Fraction of the top color's prominence a color needs to be kept
    pub const MIN_PROMINENCE: f64 = 0.01;

    /// HSV saturation a color must exceed to be kept
    pub const MIN_SATURATION: f64 = 0.05;

    /// Maximum number of colors in a palette
    pub const MAX_COLORS: usize = 5;

    /// Prominence at which the top color is the background outright
    pub const BACKGROUND_THRESHOLD: f64 = 0.5;

    /// Edge samples that must agree on an anchor to call it background
    pub const EDGE_MAJORITY: usize = 3;

    /// Largest adaptive palette the quantizer accepts
    pub const MAX_QUANTIZE_LEVELS: usize = 256;
}

/// Background detection sampling
pub mod background {
    /// Four corners plus four edge midpoints
    pub const EDGE_SAMPLE_COUNT: usize = 8;
}

/// Batch driver parameters
pub mod batch {
    /// Workers used when none are requested
    pub const WORKERS: usize = 1;

    /// Filenames handed to a worker per dequeue
    pub const BLOCK_SIZE: usize = 10;

    /// Blocks the work queue holds before the reader waits
    pub const QUEUE_CAPACITY: usize = 1000;
}

/// Swatch image layout
pub mod swatch {
    /// Edge length of one color block in pixels
    pub const BLOCK_SIZE_PX: u32 = 80;

    /// HSV value below which labels are drawn light on dark
    pub const DARK_VALUE_THRESHOLD: f64 = 0.6;

    /// Label offset from the block's top-left corner
    pub const LABEL_OFFSET_PX: u32 = 3;

    /// Integer scale applied to the bitmap font
    pub const LABEL_SCALE: u32 = 2;

    /// Suffix appended to the input file stem
    pub const FILE_SUFFIX: &str = "_palette.png";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ranges() {
        assert!(defaults::QUANTIZE_LEVELS <= defaults::MAX_QUANTIZE_LEVELS);
        assert!(defaults::MIN_SATURATION > 0.0 && defaults::MIN_SATURATION < 1.0);
        assert!(defaults::BACKGROUND_THRESHOLD > 0.0 && defaults::BACKGROUND_THRESHOLD <= 1.0);
        assert!(defaults::EDGE_MAJORITY <= background::EDGE_SAMPLE_COUNT);
    }

    #[test]
    fn test_anchor_colors() {
        assert_eq!(colors::WHITE, PixelColor::new(255, 255, 255));
        assert_eq!(colors::BLACK, PixelColor::new(0, 0, 0));
        assert_ne!(colors::WHITE, colors::BLACK);
    }
}
