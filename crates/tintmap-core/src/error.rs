//! Error types for tintmap-core
//!
//! Provides a unified error type for the data model and configuration layer.
//! Downstream crates wrap this error with `#[from]` in their own enums.

use thiserror::Error;

/// tintmap core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid image dimensions (zero width or height)
    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    /// Pixel buffer length does not match the declared dimensions
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// Two buffers that must be registered 1:1 have different sizes
    #[error("dimension mismatch: expected {}x{}, got {}x{}", .expected.0, .expected.1, .actual.0, .actual.1)]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// Color string could not be parsed
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Unknown configuration key
    #[error("unknown setting: {0}")]
    UnknownSetting(String),

    /// Configuration (de)serialization error
    #[error("settings json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for tintmap core operations
pub type Result<T> = std::result::Result<T, Error>;
