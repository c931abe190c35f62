//! Color conversion and perceptual distance module
//!
//! This module handles hex and color space conversions and the perceptual
//! distance metrics used to decide when two colors are the same cluster.

pub mod conversion;
pub mod distance;

pub use conversion::{hex_to_rgb, rgb_to_hex, rgb_to_hsv, rgb_to_lab, saturation, value};
pub use distance::{Ciede2000Distance, CmcDistance, ColorDistance, DistanceCache, DistanceMetric};
