//! Region labeling
//!
//! Turns a wall mask into a [`LabelMap`]. The scan is row-major; every
//! fillable pixel not yet visited starts a new region, which is flooded with
//! an explicit-stack depth-first search over 4-connected neighbors. Walls
//! get [`WALL_REGION`] and are never flooded.
//!
//! Because regions are numbered in discovery order, region ids are strictly
//! increasing along the scan: the first pixel of region `n + 1` always comes
//! after the first pixel of region `n`. Labeling the same mask twice gives
//! the same map.

use crate::error::{RegionError, RegionResult};
use log::debug;
use std::time::Instant;
use tintmap_core::{LabelMap, WALL_REGION, WallMask};

/// Sentinel for "not visited yet"
const UNVISITED: u32 = u32::MAX;

/// Label the 4-connected fillable regions of a wall mask
pub fn label_regions(mask: &WallMask) -> RegionResult<LabelMap> {
    let start = Instant::now();
    let (w, h) = mask.dimensions();
    let (wu, hu) = (w as usize, h as usize);
    let walls = mask.data();
    let mut labels = vec![UNVISITED; walls.len()];
    let mut next_id: u32 = 1;
    let mut stack: Vec<usize> = Vec::new();

    for i in 0..walls.len() {
        if labels[i] != UNVISITED {
            continue;
        }
        if walls[i] != 0 {
            labels[i] = WALL_REGION;
            continue;
        }
        if next_id == UNVISITED {
            return Err(RegionError::TooManyRegions { max: UNVISITED - 1 });
        }

        let id = next_id;
        next_id += 1;
        labels[i] = id;
        stack.push(i);

        while let Some(p) = stack.pop() {
            let x = p % wu;
            let y = p / wu;
            let mut visit = |q: usize| {
                if labels[q] == UNVISITED && walls[q] == 0 {
                    labels[q] = id;
                    stack.push(q);
                }
            };
            if x > 0 {
                visit(p - 1);
            }
            if x + 1 < wu {
                visit(p + 1);
            }
            if y > 0 {
                visit(p - wu);
            }
            if y + 1 < hu {
                visit(p + wu);
            }
        }
    }

    let map = LabelMap::from_vec(w, h, labels)?;
    debug!(
        "label_regions: {}x{} -> {} regions in {:?}",
        w,
        h,
        map.max_region_id(),
        start.elapsed()
    );
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plus_quadrants() {
        let mask = WallMask::from_ascii(&[".#..", "####", ".#..", ".#.."]).unwrap();
        let labels = label_regions(&mask).unwrap();
        assert_eq!(labels.max_region_id(), 4);
        assert_eq!(
            labels.labels(),
            &[1, 0, 2, 2, 0, 0, 0, 0, 3, 0, 4, 4, 3, 0, 4, 4]
        );
    }

    #[test]
    fn test_diagonal_is_not_connected() {
        let mask = WallMask::from_ascii(&[".#", "#."]).unwrap();
        let labels = label_regions(&mask).unwrap();
        assert_eq!(labels.max_region_id(), 2);
        assert_eq!(labels.region_at(0, 0), Some(1));
        assert_eq!(labels.region_at(1, 1), Some(2));
    }

    #[test]
    fn test_all_walls_and_all_open() {
        let walls = WallMask::from_fn(3, 3, |_, _| true).unwrap();
        assert_eq!(label_regions(&walls).unwrap().max_region_id(), 0);
        let open = WallMask::new(3, 3).unwrap();
        let labels = label_regions(&open).unwrap();
        assert_eq!(labels.max_region_id(), 1);
        assert!(labels.labels().iter().all(|&l| l == 1));
    }

    #[test]
    fn test_u_shape_is_one_region() {
        // the flood must reach back up the right arm
        let mask = WallMask::from_ascii(&[".#.", ".#.", "..."]).unwrap();
        let labels = label_regions(&mask).unwrap();
        assert_eq!(labels.max_region_id(), 1);
    }
}
