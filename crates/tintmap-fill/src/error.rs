//! Error types for tintmap-fill

use thiserror::Error;

/// Errors that can occur in the fill engine
#[derive(Debug, Error)]
pub enum FillError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] tintmap_core::Error),

    /// A saved coloring refers to a region the label map does not have
    #[error("unknown region {region_id} (max region id is {max_region_id})")]
    UnknownRegion { region_id: u32, max_region_id: u32 },

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Result type for fill operations
pub type FillResult<T> = Result<T, FillError>;
