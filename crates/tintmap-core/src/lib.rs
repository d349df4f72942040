//! tintmap-core - Basic data structures for the tintmap coloring engine
//!
//! This crate provides the data model shared by every pipeline stage:
//!
//! - [`RasterImage`] - immutable RGBA input raster
//! - [`WallMask`] - binary wall/fillable classification
//! - [`LabelMap`] - per-pixel region ids (0 = wall)
//! - [`RegionColorMap`] - sparse region-id to color mapping
//! - [`Rgb`] - colors, hex strings and color metrics
//! - [`Viewport`] - pan/zoom transform for click resolution
//! - [`config`] - settings with regen-level tagging

pub mod color;
pub mod config;
pub mod error;
pub mod labels;
pub mod mask;
pub mod raster;
pub mod region_colors;
pub mod viewport;

pub use color::Rgb;
pub use config::{RegenLevel, SettingKey, Settings};
pub use error::{Error, Result};
pub use labels::{LabelMap, WALL_REGION};
pub use mask::WallMask;
pub use raster::RasterImage;
pub use region_colors::RegionColorMap;
pub use viewport::Viewport;
