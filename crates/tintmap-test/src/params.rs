//! Regression test parameters and operations

use crate::error::{TestError, TestResult};
use crate::regout_dir;
use std::fs;
use tintmap_core::{LabelMap, RasterImage, WallMask};

/// Regression test mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Compare values in memory (default)
    #[default]
    Compare,
    /// Compare, and also dump intermediate images to `tests/regout`
    Display,
}

impl RegTestMode {
    /// Parse mode from the `REGTEST_MODE` environment variable
    pub fn from_env() -> Self {
        match std::env::var("REGTEST_MODE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "display" => Self::Display,
            _ => Self::Compare,
        }
    }
}

/// Regression test parameters
///
/// Tracks the test name, a running comparison index, and every failure, so
/// one test can report all mismatches instead of stopping at the first.
pub struct RegParams {
    /// Name of the test (e.g., "label")
    pub test_name: String,
    /// Current comparison index (incremented before each comparison)
    index: usize,
    /// Test mode
    pub mode: RegTestMode,
    /// Overall success status
    success: bool,
    /// Recorded failures
    failures: Vec<String>,
}

impl RegParams {
    /// Create new regression test parameters
    pub fn new(test_name: &str) -> Self {
        let mode = RegTestMode::from_env();
        if mode == RegTestMode::Display {
            let _ = fs::create_dir_all(regout_dir());
        }

        eprintln!();
        eprintln!("////////////////////////////////////////////////");
        eprintln!("////////////////   {}_reg   ///////////////", test_name);
        eprintln!("////////////////////////////////////////////////");
        eprintln!("Mode: {:?}", mode);

        Self {
            test_name: test_name.to_string(),
            index: 0,
            mode,
            success: true,
            failures: Vec::new(),
        }
    }

    /// Get the current comparison index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Check if in display mode
    pub fn display(&self) -> bool {
        self.mode == RegTestMode::Display
    }

    fn fail(&mut self, msg: String) {
        eprintln!("{}", msg);
        self.failures.push(msg);
        self.success = false;
    }

    /// Compare two floating-point values within `delta`
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.index += 1;
        let diff = (expected - actual).abs();

        if diff > delta {
            let msg = format!(
                "Failure in {}_reg: value comparison for index {}\n\
                 difference = {} but allowed delta = {}\n\
                 expected = {}, actual = {}",
                self.test_name, self.index, diff, delta, expected, actual
            );
            self.fail(msg);
            false
        } else {
            true
        }
    }

    /// Record a boolean expectation
    pub fn compare_true(&mut self, condition: bool, what: &str) -> bool {
        self.index += 1;
        if !condition {
            let msg = format!(
                "Failure in {}_reg: condition for index {} is false: {}",
                self.test_name, self.index, what
            );
            self.fail(msg);
        }
        condition
    }

    /// Compare two wall masks for exact equality
    pub fn compare_masks(&mut self, expected: &WallMask, actual: &WallMask) -> bool {
        self.index += 1;

        if expected.dimensions() != actual.dimensions() {
            let msg = format!(
                "Failure in {}_reg: mask comparison for index {} - dimension mismatch {:?} vs {:?}",
                self.test_name,
                self.index,
                expected.dimensions(),
                actual.dimensions()
            );
            self.fail(msg);
            return false;
        }

        let width = expected.width() as usize;
        if let Some(i) = expected
            .data()
            .iter()
            .zip(actual.data())
            .position(|(a, b)| a != b)
        {
            let msg = format!(
                "Failure in {}_reg: mask comparison for index {} - pixel mismatch at ({}, {})",
                self.test_name,
                self.index,
                i % width,
                i / width
            );
            self.fail(msg);
            return false;
        }

        true
    }

    /// Compare two label maps for exact equality
    pub fn compare_labels(&mut self, expected: &LabelMap, actual: &LabelMap) -> bool {
        self.index += 1;

        if expected.dimensions() != actual.dimensions()
            || expected.max_region_id() != actual.max_region_id()
        {
            let msg = format!(
                "Failure in {}_reg: label comparison for index {} - shape {:?}/{} vs {:?}/{}",
                self.test_name,
                self.index,
                expected.dimensions(),
                expected.max_region_id(),
                actual.dimensions(),
                actual.max_region_id()
            );
            self.fail(msg);
            return false;
        }

        if expected.labels() != actual.labels() {
            let msg = format!(
                "Failure in {}_reg: label comparison for index {} - label mismatch",
                self.test_name, self.index
            );
            self.fail(msg);
            return false;
        }

        true
    }

    /// Write a wall mask as a black-on-white PNG in display mode
    pub fn write_mask(&mut self, mask: &WallMask) -> TestResult<()> {
        self.index += 1;
        if !self.display() {
            return Ok(());
        }
        let pixels: Vec<u8> = mask
            .data()
            .iter()
            .map(|&v| if v != 0 { 0 } else { 255 })
            .collect();
        let img = image::GrayImage::from_raw(mask.width(), mask.height(), pixels).ok_or_else(
            || TestError::ImageWrite {
                path: self.local_path("png"),
                message: "mask buffer does not match its dimensions".into(),
            },
        )?;
        let path = self.local_path("png");
        img.save(&path).map_err(|e| TestError::ImageWrite {
            path: path.clone(),
            message: e.to_string(),
        })?;
        eprintln!("Wrote: {}", path);
        Ok(())
    }

    /// Write an RGBA raster as PNG in display mode
    pub fn write_raster(&mut self, raster: &RasterImage) -> TestResult<()> {
        self.index += 1;
        if !self.display() {
            return Ok(());
        }
        let path = self.local_path("png");
        let img = image::RgbaImage::from_raw(raster.width(), raster.height(), raster.data().to_vec())
            .ok_or_else(|| TestError::ImageWrite {
                path: path.clone(),
                message: "raster buffer does not match its dimensions".into(),
            })?;
        img.save(&path).map_err(|e| TestError::ImageWrite {
            path: path.clone(),
            message: e.to_string(),
        })?;
        eprintln!("Wrote: {}", path);
        Ok(())
    }

    fn local_path(&self, ext: &str) -> String {
        format!(
            "{}/{}.{:02}.{}",
            regout_dir(),
            self.test_name,
            self.index,
            ext
        )
    }

    /// Clean up and report results
    ///
    /// Returns `true` if all comparisons passed.
    pub fn cleanup(self) -> bool {
        if self.success {
            eprintln!("SUCCESS: {}_reg", self.test_name);
        } else {
            eprintln!("FAILURE: {}_reg", self.test_name);
            for failure in &self.failures {
                eprintln!("  {}", failure);
            }
        }
        eprintln!();

        self.success
    }

    /// Check if all comparisons have passed so far
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Get list of failures
    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}
