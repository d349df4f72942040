//! Error types for tintmap-region

use thiserror::Error;

/// Errors that can occur during region processing operations
#[derive(Debug, Error)]
pub enum RegionError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] tintmap_core::Error),

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// The label space overflowed
    #[error("too many regions: more than {max}")]
    TooManyRegions { max: u32 },
}

/// Result type for region operations
pub type RegionResult<T> = Result<T, RegionError>;
