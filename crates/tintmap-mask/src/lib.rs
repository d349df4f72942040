//! tintmap-mask - Wall masks for leak-proof coloring
//!
//! This crate turns a raster illustration into the binary wall mask that
//! every later stage depends on:
//!
//! - [`build_wall_mask`]: the synchronous builder (direct or skeleton path)
//! - [`repair`]: the leak-repair pipeline with endpoint bridging, color-edge
//!   walls and leak validation
//! - [`RepairWorker`]: runs repair jobs on a dedicated thread with
//!   generation-guarded results

pub mod builder;
mod error;
pub mod repair;
pub mod worker;

pub use error::{MaskError, MaskResult};

pub use builder::{build_wall_mask, threshold_max_channel};
pub use repair::{RepairOutput, RepairStats, repair, repair_with_cancel};
pub use worker::{JobOutcome, RepairJob, RepairWorker};
