//! tintmap - Region segmentation and leak-proof coloring
//!
//! Turns a raster illustration into a clickable map of color regions whose
//! outlines are repaired so a fill can never bleed into a neighbor.
//!
//! # Overview
//!
//! - [`Session`]: one coloring job, from raster to finished picture
//! - [`Bundle`]: the saved form of a job (camelCase JSON)
//! - [`cli`]: the `tintmap` command-line tool
//!
//! The stage crates are re-exported as modules:
//!
//! ```no_run
//! use tintmap::{Session, Settings, fill::Tool, Rgb};
//!
//! let raster = tintmap::io::read_raster("lineart.png").unwrap();
//! let mut session = Session::new(Settings::default()).unwrap();
//! session.load_raster(raster).unwrap();
//! session.click(120.0, 80.0, Tool::Fill(Rgb::new(230, 80, 60))).unwrap();
//! ```

pub mod bundle;
pub mod cli;
mod error;
pub mod io;
pub mod logger;
pub mod session;

pub use error::{TintmapError, TintmapResult};

pub use bundle::{Assets, Bundle, Layers, Manifest, RegionsLayer};
pub use session::{RepairPoll, Scene, Session};

// Re-export core types (primary data structures used everywhere)
pub use tintmap_core::*;

// Re-export stage crates as modules to avoid name conflicts
pub use tintmap_color as color;
pub use tintmap_fill as fill;
pub use tintmap_mask as mask;
pub use tintmap_morph as morph;
pub use tintmap_region as region;
pub use tintmap_render as render;
