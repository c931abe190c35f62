//! Configuration structures for palette extraction and batch processing.
//!
//! Every tuning knob lives in an explicit value passed into the pipeline, so
//! extractions with different settings can run side by side.
//!
//! # Configuration Loading
//!
//! Configuration can be loaded from JSON files or constructed programmatically:
//!
//! ```no_run
//! use colorific::PaletteConfig;
//! use std::path::Path;
//!
//! // Load from file; missing fields take their defaults
//! let config = PaletteConfig::from_json_file(Path::new("palette.json"))?;
//!
//! // Or adjust the defaults
//! let config = PaletteConfig {
//!     max_colors: 3,
//!     ..PaletteConfig::default()
//! };
//! # Ok::<(), colorific::PaletteError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::constants::{batch, colors, defaults, background};
use crate::{DistanceMetric, PaletteError, PixelColor, Result};

/// Parameters of a single palette extraction.
///
/// Serializes to and from JSON; absent fields fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    /// Adaptive palette size before clustering
    pub quantize_levels: usize,

    /// Perceptual distance below which colors merge
    pub min_distance: f64,

    /// Fraction of the top color's prominence a color needs to be kept
    pub min_prominence: f64,

    /// HSV saturation (0-1) a color must exceed to be kept
    pub min_saturation: f64,

    /// Maximum number of colors reported
    pub max_colors: usize,

    /// Prominence at which the top color is the background outright
    pub background_threshold: f64,

    /// Edge samples (of 8) that must agree on an anchor to call it background
    pub edge_majority: usize,

    /// Border color removed by autocrop
    pub crop_background: PixelColor,

    /// Perceptual distance metric
    pub distance: DistanceMetric,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            quantize_levels: defaults::QUANTIZE_LEVELS,
            min_distance: defaults::MIN_DISTANCE,
            min_prominence: defaults::MIN_PROMINENCE,
            min_saturation: defaults::MIN_SATURATION,
            max_colors: defaults::MAX_COLORS,
            background_threshold: defaults::BACKGROUND_THRESHOLD,
            edge_majority: defaults::EDGE_MAJORITY,
            crop_background: colors::WHITE,
            distance: DistanceMetric::default(),
        }
    }
}

fn check_fraction(parameter: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(PaletteError::invalid_parameter(parameter, value))
    }
}

impl PaletteConfig {
    /// Reject settings the pipeline cannot honor
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.quantize_levels == 0 || self.quantize_levels > defaults::MAX_QUANTIZE_LEVELS {
            return Err(PaletteError::invalid_parameter(
                "quantize_levels",
                self.quantize_levels,
            ));
        }
        if !self.min_distance.is_finite() || self.min_distance < 0.0 {
            return Err(PaletteError::invalid_parameter("min_distance", self.min_distance));
        }
        check_fraction("min_prominence", self.min_prominence)?;
        check_fraction("min_saturation", self.min_saturation)?;
        check_fraction("background_threshold", self.background_threshold)?;
        if self.max_colors == 0 {
            return Err(PaletteError::invalid_parameter("max_colors", self.max_colors));
        }
        if self.edge_majority == 0 || self.edge_majority > background::EDGE_SAMPLE_COUNT {
            return Err(PaletteError::invalid_parameter("edge_majority", self.edge_majority));
        }
        Ok(())
    }

    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PaletteError::config(format!("cannot read {}", path.display()), e))?;
        Self::from_json_str(&content)
            .map_err(|e| match e {
                PaletteError::ConfigError { source, .. } => PaletteError::ConfigError {
                    message: format!("cannot parse {}", path.display()),
                    source,
                },
                other => other,
            })
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| PaletteError::config("invalid palette configuration", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| PaletteError::config("cannot serialize configuration", e))?;
        std::fs::write(path, json)
            .map_err(|e| PaletteError::io(format!("cannot write {}", path.display()), e))
    }
}

/// Settings for the stream driver in [`crate::batch`].
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    /// Number of worker threads
    pub workers: usize,

    /// Filenames handed to a worker per dequeue
    pub block_size: usize,

    /// Blocks the work queue holds before the reader waits
    pub queue_capacity: usize,

    /// Write a swatch image next to each input
    pub save_palette: bool,

    /// Abandon an item that takes longer than this
    pub item_timeout: Option<Duration>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: batch::WORKERS,
            block_size: batch::BLOCK_SIZE,
            queue_capacity: batch::QUEUE_CAPACITY,
            save_palette: false,
            item_timeout: None,
        }
    }
}

impl BatchConfig {
    /// Use one worker per available CPU
    pub fn all_cpus() -> Self {
        Self {
            workers: num_cpus::get().max(1),
            ..Self::default()
        }
    }

    /// `workers` threads, where zero means one per available CPU
    pub fn with_workers(workers: usize) -> Self {
        match workers {
            0 => Self::all_cpus(),
            n => Self {
                workers: n,
                ..Self::default()
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(PaletteError::invalid_parameter("workers", self.workers));
        }
        if self.block_size == 0 {
            return Err(PaletteError::invalid_parameter("block_size", self.block_size));
        }
        if self.queue_capacity == 0 {
            return Err(PaletteError::invalid_parameter("queue_capacity", self.queue_capacity));
        }
        if self.item_timeout == Some(Duration::ZERO) {
            return Err(PaletteError::invalid_parameter("item_timeout", "0s"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PaletteConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.quantize_levels, 100);
        assert_eq!(config.min_distance, 10.0);
        assert_eq!(config.min_prominence, 0.01);
        assert_eq!(config.min_saturation, 0.05);
        assert_eq!(config.max_colors, 5);
        assert_eq!(config.background_threshold, 0.5);
        assert_eq!(config.crop_background, PixelColor::new(255, 255, 255));

        assert!(BatchConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let bad = [
            PaletteConfig { quantize_levels: 0, ..Default::default() },
            PaletteConfig { quantize_levels: 257, ..Default::default() },
            PaletteConfig { min_distance: -1.0, ..Default::default() },
            PaletteConfig { min_distance: f64::NAN, ..Default::default() },
            PaletteConfig { min_saturation: 1.5, ..Default::default() },
            PaletteConfig { min_prominence: -0.1, ..Default::default() },
            PaletteConfig { background_threshold: 2.0, ..Default::default() },
            PaletteConfig { max_colors: 0, ..Default::default() },
            PaletteConfig { edge_majority: 9, ..Default::default() },
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(PaletteError::InvalidParameter { .. })),
                "accepted {:?}",
                config
            );
        }
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = PaletteConfig::from_json_str(
            r##"{"max_colors": 3, "crop_background": "#000000", "distance": "ciede2000"}"##,
        )
        .unwrap();
        assert_eq!(config.max_colors, 3);
        assert_eq!(config.crop_background, PixelColor::new(0, 0, 0));
        assert_eq!(config.distance, DistanceMetric::Ciede2000);
        assert_eq!(config.quantize_levels, 100);
    }

    #[test]
    fn test_json_validation_and_parse_errors() {
        assert!(matches!(
            PaletteConfig::from_json_str(r#"{"max_colors": 0}"#),
            Err(PaletteError::InvalidParameter { .. })
        ));
        assert!(matches!(
            PaletteConfig::from_json_str("{not json"),
            Err(PaletteError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_json_file_round_trip() {
        let path = std::env::temp_dir().join(format!("colorific_config_{}.json", std::process::id()));
        let config = PaletteConfig {
            min_distance: 12.5,
            edge_majority: 4,
            ..Default::default()
        };
        config.to_json_file(&path).unwrap();
        let loaded = PaletteConfig::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = PaletteConfig::from_json_file(Path::new("/nonexistent/colorific.json"));
        assert!(matches!(result, Err(PaletteError::ConfigError { .. })));
    }

    #[test]
    fn test_batch_validate() {
        assert!(BatchConfig { workers: 0, ..Default::default() }.validate().is_err());
        assert!(BatchConfig { block_size: 0, ..Default::default() }.validate().is_err());
        assert!(BatchConfig {
            item_timeout: Some(Duration::ZERO),
            ..Default::default()
        }
        .validate()
        .is_err());
        assert!(BatchConfig::all_cpus().workers >= 1);
    }

    #[test]
    fn test_with_workers() {
        assert_eq!(BatchConfig::with_workers(3).workers, 3);
        assert_eq!(BatchConfig::with_workers(0), BatchConfig::all_cpus());
        assert!(BatchConfig::with_workers(0).validate().is_ok());
        assert_eq!(BatchConfig::with_workers(1), BatchConfig::default());
    }
}
