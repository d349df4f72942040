//! Leak validation
//!
//! Tiny regions left after repair are almost always slivers where an
//! outline leaked rather than real areas to color. They are absorbed into
//! the wall, the mask is optionally closed once more, and everything is
//! labeled again from scratch.

use crate::error::MaskResult;
use log::debug;
use tintmap_core::config::LeakValidationParams;
use tintmap_core::{LabelMap, WallMask};
use tintmap_morph::close_disk;
use tintmap_region::{absorb_small_regions, label_regions};

/// Radius of the strengthening close
pub const STRENGTHEN_RADIUS: u32 = 2;

/// Absorb small islands, optionally strengthen, and relabel
///
/// Returns the repaired mask, its fresh labels, and the number of islands
/// absorbed.
pub fn validate_leaks(
    mask: &WallMask,
    labels: &LabelMap,
    params: &LeakValidationParams,
) -> MaskResult<(WallMask, LabelMap, usize)> {
    if !params.enabled {
        return Ok((mask.clone(), labels.clone(), 0));
    }

    let (mut out, islands) = absorb_small_regions(mask, labels, params.small_island_tolerance_px)?;
    if params.strengthen_once {
        out = close_disk(&out, STRENGTHEN_RADIUS)?;
    }
    let relabeled = label_regions(&out)?;
    debug!(
        "validate_leaks: {} islands absorbed, {} -> {} regions",
        islands,
        labels.max_region_id(),
        relabeled.max_region_id()
    );
    Ok((out, relabeled, islands))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_islands_become_wall() {
        let mask = WallMask::from_ascii(&[
            "##########",
            "#....###.#",
            "#....#.#.#",
            "#....###.#",
            "#........#",
            "##########",
        ])
        .unwrap();
        let labels = label_regions(&mask).unwrap();
        assert_eq!(labels.max_region_id(), 2);
        let params = LeakValidationParams {
            enabled: true,
            small_island_tolerance_px: 2,
            strengthen_once: false,
        };
        let (out, relabeled, islands) = validate_leaks(&mask, &labels, &params).unwrap();
        assert_eq!(islands, 1);
        assert!(out.is_wall(6, 2));
        assert_eq!(relabeled.max_region_id(), 1);
    }
}
