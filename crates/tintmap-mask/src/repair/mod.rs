//! Leak repair pipeline
//!
//! A heavier front end than [`crate::builder`], meant to run off the
//! interactive thread (see [`crate::worker`]). Stages run strictly in this
//! order:
//!
//! 1. outline threshold on RGB distance to black (alpha ignored)
//! 2. dilate by `thicken_px`
//! 3. close with radius `ceil(close_kernel_px / 2)`
//! 4. endpoint bridging
//! 5. color-edge wall insertion
//! 6. open with radius `ceil(open_kernel_px / 2)`
//! 7. region labeling
//! 8. leak validation and relabeling
//!
//! The cancel flag is checked between stages; a cancelled run returns
//! [`MaskError::Cancelled`] and produces nothing.

pub mod bridge;
pub mod color_edge;
pub mod validate;

use crate::error::{MaskError, MaskResult};
use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tintmap_core::config::RepairParams;
use tintmap_core::{LabelMap, RasterImage, Rgb, WallMask};
use tintmap_morph::{close_disk, dilate_disk, open_disk};
use tintmap_region::label_regions;

pub use bridge::{Bridge, BridgeReport, Endpoint, bridge_budget, bridge_endpoints, find_endpoints};
pub use color_edge::{color_edge_mask, insert_color_edge_walls};
pub use validate::validate_leaks;

/// Counters collected over one repair run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepairStats {
    /// Line endpoints found before bridging
    pub endpoints: usize,
    /// Bridges drawn
    pub bridges: usize,
    /// Wall pixels added along color edges
    pub color_edge_pixels: usize,
    /// Small regions absorbed into the wall
    pub islands_removed: usize,
    /// Wall time of the whole run
    pub elapsed: Duration,
}

/// Repaired mask with its labels
#[derive(Debug, Clone)]
pub struct RepairOutput {
    pub mask: WallMask,
    pub labels: LabelMap,
    pub stats: RepairStats,
}

/// Run the repair pipeline to completion
pub fn repair(raster: &RasterImage, params: &RepairParams) -> MaskResult<RepairOutput> {
    repair_with_cancel(raster, params, &AtomicBool::new(false))
}

/// Run the repair pipeline, stopping early once `cancel` is set
pub fn repair_with_cancel(
    raster: &RasterImage,
    params: &RepairParams,
    cancel: &AtomicBool,
) -> MaskResult<RepairOutput> {
    check_params(params)?;
    let start = Instant::now();
    let mut stats = RepairStats::default();

    checkpoint(cancel)?;
    let mask = threshold_distance_to_black(raster, params.outline_black_rgb_distance)?;
    debug!("repair: threshold -> {} wall pixels", mask.count_walls());

    checkpoint(cancel)?;
    let mask = dilate_disk(&mask, params.thicken_px)?;

    checkpoint(cancel)?;
    let mut mask = close_disk(&mask, params.close_kernel_px.div_ceil(2))?;

    checkpoint(cancel)?;
    let report = bridge_endpoints(&mut mask, &params.endpoint_bridge)?;
    stats.endpoints = report.endpoints;
    stats.bridges = report.bridges.len();

    checkpoint(cancel)?;
    stats.color_edge_pixels = insert_color_edge_walls(&mut mask, raster, &params.color_edge_walls)?;

    checkpoint(cancel)?;
    let mask = open_disk(&mask, params.open_kernel_px.div_ceil(2))?;

    checkpoint(cancel)?;
    let labels = label_regions(&mask)?;

    checkpoint(cancel)?;
    let (mask, labels, islands) = validate_leaks(&mask, &labels, &params.leak_validation)?;
    stats.islands_removed = islands;
    stats.elapsed = start.elapsed();

    info!(
        "repair: {}x{} -> {} regions ({} bridges, {} islands) in {:?}",
        mask.width(),
        mask.height(),
        labels.max_region_id(),
        stats.bridges,
        stats.islands_removed,
        stats.elapsed
    );
    Ok(RepairOutput {
        mask,
        labels,
        stats,
    })
}

fn checkpoint(cancel: &AtomicBool) -> MaskResult<()> {
    if cancel.load(Ordering::Acquire) {
        Err(MaskError::Cancelled)
    } else {
        Ok(())
    }
}

/// Wall where the Euclidean RGB distance to black is below `distance`
pub fn threshold_distance_to_black(raster: &RasterImage, distance: f64) -> MaskResult<WallMask> {
    let limit = distance * distance;
    let data: Vec<u8> = raster
        .pixels()
        .map(|c| u8::from((c.distance_sq(Rgb::BLACK) as f64) < limit))
        .collect();
    Ok(WallMask::from_vec(raster.width(), raster.height(), data)?)
}

fn check_params(params: &RepairParams) -> MaskResult<()> {
    let finite_non_negative = [
        ("outline_black_rgb_distance", params.outline_black_rgb_distance),
        (
            "endpoint_bridge.max_endpoint_distance_px",
            params.endpoint_bridge.max_endpoint_distance_px,
        ),
        (
            "endpoint_bridge.max_bridges_per_megapixel",
            params.endpoint_bridge.max_bridges_per_megapixel,
        ),
        (
            "color_edge_walls.min_color_delta_l2",
            params.color_edge_walls.min_color_delta_l2,
        ),
    ];
    for (name, value) in finite_non_negative {
        if !value.is_finite() || value < 0.0 {
            return Err(MaskError::InvalidParameters(format!(
                "{} must be a finite non-negative number, got {}",
                name, value
            )));
        }
    }
    let angle = params.endpoint_bridge.angle_limit_degrees;
    if !(0.0..=180.0).contains(&angle) {
        return Err(MaskError::InvalidParameters(format!(
            "endpoint_bridge.angle_limit_degrees must be within [0, 180], got {}",
            angle
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outline() -> RasterImage {
        // 1-pixel square outline with a 3-pixel gap on top
        let mut raster = RasterImage::filled(24, 24, Rgb::WHITE).unwrap();
        for i in 4..20 {
            if !(11..14).contains(&i) {
                raster = raster.with_pixel(i, 4, Rgb::BLACK);
            }
            raster = raster
                .with_pixel(i, 19, Rgb::BLACK)
                .with_pixel(4, i, Rgb::BLACK)
                .with_pixel(19, i, Rgb::BLACK);
        }
        raster
    }

    fn thin_params() -> RepairParams {
        let mut params = RepairParams {
            thicken_px: 0,
            close_kernel_px: 0,
            ..Default::default()
        };
        params.endpoint_bridge.max_bridges_per_megapixel = 1e5;
        params.leak_validation.strengthen_once = false;
        params
    }

    #[test]
    fn test_bridging_seals_the_gap() {
        let mut params = thin_params();
        params.endpoint_bridge.enabled = false;
        let leaky = repair(&outline(), &params).unwrap();
        assert_eq!(leaky.labels.max_region_id(), 1);

        let sealed = repair(&outline(), &thin_params()).unwrap();
        assert_eq!(sealed.stats.bridges, 1);
        assert_eq!(sealed.labels.max_region_id(), 2);
    }

    #[test]
    fn test_cancelled_before_start() {
        let cancel = AtomicBool::new(true);
        let result = repair_with_cancel(&outline(), &RepairParams::default(), &cancel);
        assert!(matches!(result, Err(MaskError::Cancelled)));
    }

    #[test]
    fn test_rejects_bad_params() {
        let mut params = RepairParams::default();
        params.endpoint_bridge.angle_limit_degrees = 270.0;
        assert!(matches!(
            repair(&outline(), &params),
            Err(MaskError::InvalidParameters(_))
        ));
        let mut params = RepairParams::default();
        params.outline_black_rgb_distance = f64::NAN;
        assert!(repair(&outline(), &params).is_err());
    }

    #[test]
    fn test_alpha_is_ignored() {
        let data = vec![0, 0, 0, 0, 255, 255, 255, 0];
        let raster = RasterImage::from_rgba(2, 1, data).unwrap();
        let mask = threshold_distance_to_black(&raster, 120.0).unwrap();
        assert_eq!(mask.to_ascii(), vec!["#."]);
    }
}
