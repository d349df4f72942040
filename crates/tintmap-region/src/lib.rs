//! tintmap-region - Region labeling and component analysis
//!
//! - [`label_regions`]: wall mask to [`tintmap_core::LabelMap`] by
//!   4-connected labeling in row-major discovery order
//! - Wall despeckling and small-region absorption
//! - Per-region statistics and the qualifying-region set

pub mod conncomp;
mod error;
pub mod label;

pub use error::{RegionError, RegionResult};

// Re-export labeling
pub use label::label_regions;

// Re-export component analysis
pub use conncomp::{
    ComponentStats, DespeckleResult, absorb_small_regions, qualifying_regions, region_stats,
    remove_small_wall_components,
};
