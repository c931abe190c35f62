//! Perceptual color distance
//!
//! Extraction only needs a metric-like `distance(a, b)`: zero for equal
//! colors, symmetric, and growing with perceived difference. Two metrics are
//! provided, both computed in CIE Lab:
//! - CMC l:c (2:1), the textile-industry acceptability metric (default)
//! - CIEDE2000, via the `palette` crate
//!
//! [`DistanceCache`] memoizes results for one extraction call.

use palette::color_difference::Ciede2000;
use palette::white_point::D65;
use palette::Lab;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::color::conversion::rgb_to_lab;
use crate::{PaletteError, PixelColor};

/// A perceptual distance between two colors
pub trait ColorDistance {
    /// Distance between `a` and `b`; must be symmetric and zero when equal
    fn distance(&self, a: PixelColor, b: PixelColor) -> f64;
}

/// CMC l:c color difference
///
/// CMC measures the difference relative to a reference color, so it is not
/// symmetric on its own. The reported distance is the mean of both
/// orderings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CmcDistance {
    /// Lightness weight (l)
    pub lightness: f64,
    /// Chroma weight (c)
    pub chroma: f64,
}

impl Default for CmcDistance {
    /// The 2:1 "acceptability" weighting
    fn default() -> Self {
        Self {
            lightness: 2.0,
            chroma: 1.0,
        }
    }
}

impl CmcDistance {
    /// One-directional CMC difference of `sample` from `reference`
    fn directed(&self, reference: Lab<D65, f64>, sample: Lab<D65, f64>) -> f64 {
        let c1 = reference.a.hypot(reference.b);
        let c2 = sample.a.hypot(sample.b);

        let delta_l = reference.l - sample.l;
        let delta_c = c1 - c2;
        let delta_a = reference.a - sample.a;
        let delta_b = reference.b - sample.b;
        let delta_h_sq = (delta_a * delta_a + delta_b * delta_b - delta_c * delta_c).max(0.0);

        let mut h1 = reference.b.atan2(reference.a).to_degrees();
        if h1 < 0.0 {
            h1 += 360.0;
        }

        let c1_4 = c1.powi(4);
        let f = (c1_4 / (c1_4 + 1900.0)).sqrt();
        let t = if (164.0..=345.0).contains(&h1) {
            0.56 + (0.2 * (h1 + 168.0).to_radians().cos()).abs()
        } else {
            0.36 + (0.4 * (h1 + 35.0).to_radians().cos()).abs()
        };

        let s_l = if reference.l < 16.0 {
            0.511
        } else {
            (0.040975 * reference.l) / (1.0 + 0.01765 * reference.l)
        };
        let s_c = (0.0638 * c1) / (1.0 + 0.0131 * c1) + 0.638;
        let s_h = s_c * (f * t + 1.0 - f);

        let term_l = delta_l / (self.lightness * s_l);
        let term_c = delta_c / (self.chroma * s_c);
        (term_l * term_l + term_c * term_c + delta_h_sq / (s_h * s_h)).sqrt()
    }
}

impl ColorDistance for CmcDistance {
    fn distance(&self, a: PixelColor, b: PixelColor) -> f64 {
        if a == b {
            return 0.0;
        }
        let lab_a = rgb_to_lab(a);
        let lab_b = rgb_to_lab(b);
        0.5 * (self.directed(lab_a, lab_b) + self.directed(lab_b, lab_a))
    }
}

/// CIEDE2000 color difference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ciede2000Distance;

impl ColorDistance for Ciede2000Distance {
    fn distance(&self, a: PixelColor, b: PixelColor) -> f64 {
        if a == b {
            return 0.0;
        }
        rgb_to_lab(a).difference(rgb_to_lab(b))
    }
}

/// Configurable choice of distance metric
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    #[default]
    Cmc,
    Ciede2000,
}

impl ColorDistance for DistanceMetric {
    fn distance(&self, a: PixelColor, b: PixelColor) -> f64 {
        match self {
            DistanceMetric::Cmc => CmcDistance::default().distance(a, b),
            DistanceMetric::Ciede2000 => Ciede2000Distance.distance(a, b),
        }
    }
}

impl FromStr for DistanceMetric {
    type Err = PaletteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cmc" | "cmc21" | "delta_e_cmc" => Ok(Self::Cmc),
            "ciede2000" | "de2000" | "deltae2000" | "de00" => Ok(Self::Ciede2000),
            _ => Err(PaletteError::invalid_parameter("distance", s)),
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceMetric::Cmc => f.write_str("cmc"),
            DistanceMetric::Ciede2000 => f.write_str("ciede2000"),
        }
    }
}

/// Bounded memo of distances keyed by unordered color pair
///
/// Scoped to a single extraction; once `capacity` entries are stored, new
/// pairs are computed but not remembered.
pub struct DistanceCache<D> {
    metric: D,
    entries: HashMap<(PixelColor, PixelColor), f64>,
    capacity: usize,
    hits: usize,
    misses: usize,
}

impl<D: ColorDistance> DistanceCache<D> {
    pub fn new(metric: D, capacity: usize) -> Self {
        Self {
            metric,
            entries: HashMap::with_capacity(capacity.min(4096)),
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    /// Cache sized for an image quantized to `levels` colors plus the two
    /// fixed anchors
    pub fn for_levels(metric: D, levels: usize) -> Self {
        let n = levels.saturating_add(2);
        Self::new(metric, n.saturating_mul(n))
    }

    pub fn distance(&mut self, a: PixelColor, b: PixelColor) -> f64 {
        let key = if a.channels() <= b.channels() { (a, b) } else { (b, a) };

        if let Some(&d) = self.entries.get(&key) {
            self.hits += 1;
            return d;
        }

        self.misses += 1;
        let d = self.metric.distance(key.0, key.1);
        if self.entries.len() < self.capacity {
            self.entries.insert(key, d);
        }
        d
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (hits, misses) since creation
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex_to_rgb;

    const CORE_COLORS: [&str; 5] = ["#000000", "#0000ff", "#00ff00", "#ff0000", "#ffffff"];

    const APPARENT_MISTAKES: [(&str, &str); 5] = [
        ("#f1f1f1", "#f2f2f2"),
        ("#f2f2f2", "#f3f3f3"),
        ("#fafafa", "#fbfbfb"),
        ("#7c7c7c", "#7d7d7d"),
        ("#29abe1", "#29abe2"),
    ];

    fn hex_distance(metric: &impl ColorDistance, a: &str, b: &str) -> f64 {
        metric.distance(hex_to_rgb(a).unwrap(), hex_to_rgb(b).unwrap())
    }

    #[test]
    fn test_core_colors_are_distinct() {
        for metric in [DistanceMetric::Cmc, DistanceMetric::Ciede2000] {
            for (i, a) in CORE_COLORS.iter().enumerate() {
                for b in &CORE_COLORS[i + 1..] {
                    let d = hex_distance(&metric, a, b);
                    assert!(d >= 10.0, "{} vs {} too close under {}: {}", a, b, metric, d);
                }
            }
        }
    }

    #[test]
    fn test_apparent_mistakes_are_similar() {
        for metric in [DistanceMetric::Cmc, DistanceMetric::Ciede2000] {
            for (a, b) in APPARENT_MISTAKES {
                let d = hex_distance(&metric, a, b);
                assert!(d < 10.0, "{} vs {} too far under {}: {}", a, b, metric, d);
            }
        }
    }

    #[test]
    fn test_metric_sanity() {
        let samples = [
            PixelColor::new(0, 0, 0),
            PixelColor::new(255, 255, 255),
            PixelColor::new(41, 171, 225),
            PixelColor::new(200, 30, 90),
            PixelColor::new(124, 124, 124),
            PixelColor::new(250, 240, 10),
        ];
        let cmc = CmcDistance::default();
        for &a in &samples {
            assert_eq!(cmc.distance(a, a), 0.0);
            assert_eq!(Ciede2000Distance.distance(a, a), 0.0);
            for &b in &samples {
                assert_eq!(cmc.distance(a, b), cmc.distance(b, a));
                let forward = Ciede2000Distance.distance(a, b);
                let backward = Ciede2000Distance.distance(b, a);
                assert!((forward - backward).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_cmc_grows_with_difference() {
        let cmc = CmcDistance::default();
        let base = PixelColor::new(120, 60, 60);
        let near = cmc.distance(base, PixelColor::new(125, 60, 60));
        let far = cmc.distance(base, PixelColor::new(200, 60, 60));
        assert!(near < far);
    }

    #[test]
    fn test_metric_from_str() {
        assert_eq!("CMC".parse::<DistanceMetric>().unwrap(), DistanceMetric::Cmc);
        assert_eq!("de2000".parse::<DistanceMetric>().unwrap(), DistanceMetric::Ciede2000);
        assert!("euclid".parse::<DistanceMetric>().is_err());
        assert_eq!(DistanceMetric::Ciede2000.to_string(), "ciede2000");
    }

    #[test]
    fn test_cache_is_order_independent() {
        let mut cache = DistanceCache::new(DistanceMetric::Cmc, 16);
        let a = PixelColor::new(10, 20, 30);
        let b = PixelColor::new(30, 20, 10);

        let first = cache.distance(a, b);
        let second = cache.distance(b, a);
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats(), (1, 1));
    }

    #[test]
    fn test_cache_is_bounded() {
        let mut cache = DistanceCache::new(DistanceMetric::Cmc, 2);
        let origin = PixelColor::new(0, 0, 0);
        for v in 1..=5u8 {
            cache.distance(origin, PixelColor::new(v * 40, 0, 0));
        }
        assert_eq!(cache.len(), 2);

        // Uncached pairs are still computed correctly
        let d = cache.distance(origin, PixelColor::new(200, 0, 0));
        assert_eq!(d, DistanceMetric::Cmc.distance(origin, PixelColor::new(200, 0, 0)));
    }

    #[test]
    fn test_cache_for_levels() {
        let cache = DistanceCache::for_levels(Ciede2000Distance, 100);
        assert_eq!(cache.capacity, 102 * 102);
        assert!(cache.is_empty());
    }
}
