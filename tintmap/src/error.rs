//! Error types for the tintmap facade

use thiserror::Error;

/// Errors surfaced by [`crate::Session`], bundles and the CLI
#[derive(Debug, Error)]
pub enum TintmapError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] tintmap_core::Error),

    #[error("region error: {0}")]
    Region(#[from] tintmap_region::RegionError),

    #[error("mask error: {0}")]
    Mask(#[from] tintmap_mask::MaskError),

    #[error("color error: {0}")]
    Color(#[from] tintmap_color::ColorError),

    #[error("fill error: {0}")]
    Fill(#[from] tintmap_fill::FillError),

    #[error("render error: {0}")]
    Render(#[from] tintmap_render::RenderError),

    /// Image decoding or encoding failed
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An operation needs a loaded raster
    #[error("no raster loaded")]
    NoRaster,

    /// An operation needs a labeled scene
    #[error("no scene: load a raster and wait for processing first")]
    NoScene,

    /// A bundle is internally inconsistent
    #[error("invalid bundle: {0}")]
    InvalidBundle(String),

    /// A repair job did not finish successfully
    #[error("repair failed: {cause}")]
    RepairFailed { cause: String },
}

/// Result type for facade operations
pub type TintmapResult<T> = Result<T, TintmapError>;
