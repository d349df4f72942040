//! Error types for tintmap-mask

use thiserror::Error;

/// Errors that can occur while building or repairing wall masks
#[derive(Debug, Error)]
pub enum MaskError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] tintmap_core::Error),

    /// Morphology error
    #[error("morphology error: {0}")]
    Morph(#[from] tintmap_morph::MorphError),

    /// Region labeling error
    #[error("region error: {0}")]
    Region(#[from] tintmap_region::RegionError),

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// The repair job was cancelled between stages
    #[error("repair cancelled")]
    Cancelled,

    /// The repair worker failed
    #[error("repair worker failed: {cause}")]
    WorkerFailed { cause: String },
}

/// Result type for mask operations
pub type MaskResult<T> = Result<T, MaskError>;
