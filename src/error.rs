//! Error types for the colorific library

use thiserror::Error;

/// Result type alias for colorific operations
pub type Result<T> = std::result::Result<T, PaletteError>;

/// Error types for palette extraction and the surrounding batch plumbing
#[derive(Error, Debug)]
pub enum PaletteError {
    /// Image file could not be opened or decoded
    #[error("Failed to decode image: {message}")]
    DecodeError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Image has no pixels left to analyze
    #[error("Degenerate input: image is {width}x{height} after cropping")]
    DegenerateImage { width: u32, height: u32 },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    /// Color could not be parsed or converted
    #[error("Color conversion error: {message}")]
    ColorConversionError { message: String },

    /// Internal consistency check failed; indicates a logic bug
    #[error("Invariant violated: {reason}")]
    InvariantViolation { reason: String },

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Reading input or writing output failed
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// A batch item exceeded its time limit
    #[error("Timed out: {item} took longer than {limit_ms}ms")]
    TimeoutError { item: String, limit_ms: u64 },
}

impl PaletteError {
    /// Create a decode error with context
    pub fn decode<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::DecodeError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error with context
    pub fn config<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ConfigError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoError {
            message: message.into(),
            source,
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    /// Check if this error only affects a single image
    ///
    /// Batch callers may skip the item and keep going. Invariant violations
    /// and output failures are never recoverable.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PaletteError::DecodeError { .. }
                | PaletteError::DegenerateImage { .. }
                | PaletteError::TimeoutError { .. }
        )
    }

    /// Get user-friendly error description for application display
    pub fn user_message(&self) -> String {
        match self {
            PaletteError::DecodeError { .. } => {
                "Could not read the image. Please check the file format and try again.".to_string()
            }
            PaletteError::DegenerateImage { .. } => {
                "The image has no pixels to analyze.".to_string()
            }
            PaletteError::InvalidParameter { parameter, value } => {
                format!("The setting '{}' has an unusable value ({}).", parameter, value)
            }
            PaletteError::TimeoutError { item, .. } => {
                format!("Gave up on {} because it took too long.", item)
            }
            _ => "Palette detection failed. Please try with a different image.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        let decode = PaletteError::decode(
            "bad header",
            std::io::Error::new(std::io::ErrorKind::InvalidData, "truncated"),
        );
        assert!(decode.is_recoverable());
        assert!(PaletteError::DegenerateImage { width: 0, height: 0 }.is_recoverable());

        let invariant = PaletteError::InvariantViolation {
            reason: "missing anchor".into(),
        };
        assert!(!invariant.is_recoverable());
    }

    #[test]
    fn test_error_display() {
        let err = PaletteError::invalid_parameter("max_colors", 0);
        assert_eq!(err.to_string(), "Invalid parameter: max_colors = 0");

        let err = PaletteError::DegenerateImage { width: 0, height: 4 };
        assert!(err.to_string().contains("0x4"));
    }

    #[test]
    fn test_decode_error_keeps_source() {
        use std::error::Error;

        let err = PaletteError::decode(
            "photo.jpg",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.source().is_some());
        assert!(err.user_message().contains("Could not read"));
    }
}
