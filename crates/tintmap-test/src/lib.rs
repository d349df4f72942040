//! tintmap-test - Regression test framework for tintmap
//!
//! A small harness in the style of a classic `regutils` driver. Each
//! regression test creates a [`RegParams`], records numbered comparisons,
//! and asserts on [`RegParams::cleanup`] at the end so every mismatch in a
//! test is reported, not only the first.
//!
//! # Usage
//!
//! ```ignore
//! use tintmap_test::RegParams;
//!
//! let mut rp = RegParams::new("label");
//! rp.compare_values(4.0, labels.max_region_id() as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: "compare" (default) or "display"; display mode also
//!   writes intermediate masks and rasters as PNG under `tests/regout`

mod error;
pub mod fixtures;
mod params;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // tintmap-test is at crates/tintmap-test, so go up two directories
    format!("{}/../..", manifest_dir)
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}
