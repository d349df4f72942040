//! tintmap-morph - Morphological operations on wall masks
//!
//! This crate provides:
//!
//! - Structuring elements ([`Sel`]), chiefly digital disks
//! - Binary morphology (dilate, erode, open, close) with out-of-canvas
//!   pixels excluded
//! - Zhang-Suen skeletonization
//! - A 3×3 median filter used as a despeckling grayscale proxy
//! - Bresenham line drawing and border stamping

pub mod binary;
pub mod draw;
mod error;
pub mod filter;
pub mod sel;
pub mod thin;

pub use error::{MorphError, MorphResult};
pub use sel::Sel;

// Re-export binary morphology
pub use binary::{close, close_disk, dilate, dilate_disk, erode, erode_disk, open, open_disk};

// Re-export drawing and filtering
pub use draw::{draw_line, line_points, stamp_border};
pub use filter::median3x3_green;

// Re-export thinning
pub use thin::zhang_suen;
