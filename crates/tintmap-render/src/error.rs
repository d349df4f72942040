//! Error types for tintmap-render

use thiserror::Error;

/// Errors that can occur while compositing on the GPU
#[derive(Debug, Error)]
pub enum RenderError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] tintmap_core::Error),

    /// No GPU adapter is available
    #[error("no GPU adapter available")]
    NoAdapter,

    /// The adapter refused to create a device
    #[error("failed to request GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    /// Region ids do not fit the 16-bit label texture
    #[error("too many regions for the label texture: max region id {max_region_id} > 65535")]
    TooManyRegions { max_region_id: u32 },

    /// The palette texture would exceed the device limit
    #[error("palette needs {width} texels but the device allows {limit}")]
    PaletteTooWide { width: u32, limit: u32 },

    /// Inputs or the frame exceed or disagree with the uploaded scene
    #[error("dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// Nothing to draw yet
    #[error("no label map uploaded")]
    NoScene,

    /// Reading the rendered frame back failed
    #[error("readback failed: {0}")]
    Readback(String),
}

/// Result type for render operations
pub type RenderResult<T> = Result<T, RenderError>;
