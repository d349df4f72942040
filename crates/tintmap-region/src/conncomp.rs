//! Connected components of walls and regions
//!
//! Wall despeckling and per-region statistics. Wall components are found
//! with the same explicit-stack flood the labeler uses, but over wall
//! pixels instead of fillable ones.

use crate::error::RegionResult;
use log::debug;
use tintmap_core::{LabelMap, WALL_REGION, WallMask};

/// 4-connected neighbor offsets (N, W, E, S)
const FOUR_WAY: [(i32, i32); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

/// Result of [`remove_small_wall_components`]
#[derive(Debug, Clone)]
pub struct DespeckleResult {
    /// The cleaned mask
    pub mask: WallMask,
    /// Number of wall components removed
    pub components_removed: usize,
    /// Number of wall pixels cleared
    pub pixels_removed: usize,
}

/// Clear 4-connected wall components with fewer than `min_size` pixels
///
/// A `min_size` of 0 or 1 removes nothing.
pub fn remove_small_wall_components(
    mask: &WallMask,
    min_size: u32,
) -> RegionResult<DespeckleResult> {
    let mut out = mask.clone();
    if min_size <= 1 {
        return Ok(DespeckleResult {
            mask: out,
            components_removed: 0,
            pixels_removed: 0,
        });
    }

    let (w, h) = (mask.width() as i32, mask.height() as i32);
    let walls = mask.data();
    let mut visited = vec![false; walls.len()];
    let mut stack: Vec<usize> = Vec::new();
    let mut component: Vec<usize> = Vec::new();
    let mut components_removed = 0;
    let mut pixels_removed = 0;

    for start in 0..walls.len() {
        if visited[start] || walls[start] == 0 {
            continue;
        }
        component.clear();
        visited[start] = true;
        stack.push(start);
        while let Some(p) = stack.pop() {
            component.push(p);
            let x = (p % w as usize) as i32;
            let y = (p / w as usize) as i32;
            for &(dx, dy) in &FOUR_WAY {
                let nx = x + dx;
                let ny = y + dy;
                if nx < 0 || ny < 0 || nx >= w || ny >= h {
                    continue;
                }
                let q = (ny * w + nx) as usize;
                if !visited[q] && walls[q] != 0 {
                    visited[q] = true;
                    stack.push(q);
                }
            }
        }

        if component.len() < min_size as usize {
            let data = out.data_mut();
            for &p in &component {
                data[p] = 0;
            }
            components_removed += 1;
            pixels_removed += component.len();
        }
    }

    debug!(
        "despeckle: removed {} components ({} pixels) below {}",
        components_removed, pixels_removed, min_size
    );
    Ok(DespeckleResult {
        mask: out,
        components_removed,
        pixels_removed,
    })
}

/// Turn every region smaller than `min_size` pixels into wall
///
/// Returns the new mask and the number of regions absorbed. The label map
/// must be registered 1:1 with the mask.
pub fn absorb_small_regions(
    mask: &WallMask,
    labels: &LabelMap,
    min_size: u32,
) -> RegionResult<(WallMask, usize)> {
    mask.check_same_size(labels.width(), labels.height())?;
    let sizes = labels.region_sizes();
    let small: Vec<bool> = sizes
        .iter()
        .enumerate()
        .map(|(id, &n)| id as u32 != WALL_REGION && n < min_size)
        .collect();
    let absorbed = small.iter().filter(|&&s| s).count();

    let mut out = mask.clone();
    if absorbed > 0 {
        let data = out.data_mut();
        for (d, &l) in data.iter_mut().zip(labels.labels()) {
            if small[l as usize] {
                *d = 1;
            }
        }
    }
    Ok((out, absorbed))
}

/// Statistics for one region
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentStats {
    /// Region id
    pub id: u32,
    /// Number of pixels
    pub pixel_count: u32,
    /// Bounding box as (min_x, min_y, max_x, max_y), inclusive
    pub bounds: (u32, u32, u32, u32),
    /// Mean pixel position
    pub centroid: (f64, f64),
}

/// Compute statistics for every region, ordered by id
pub fn region_stats(labels: &LabelMap) -> Vec<ComponentStats> {
    let n = labels.max_region_id() as usize;
    let mut acc: Vec<(u32, u64, u64, u32, u32, u32, u32)> =
        vec![(0, 0, 0, u32::MAX, u32::MAX, 0, 0); n + 1];
    let w = labels.width() as usize;

    for (i, &l) in labels.labels().iter().enumerate() {
        if l == WALL_REGION {
            continue;
        }
        let x = (i % w) as u32;
        let y = (i / w) as u32;
        let a = &mut acc[l as usize];
        a.0 += 1;
        a.1 += x as u64;
        a.2 += y as u64;
        a.3 = a.3.min(x);
        a.4 = a.4.min(y);
        a.5 = a.5.max(x);
        a.6 = a.6.max(y);
    }

    acc.iter()
        .enumerate()
        .skip(1)
        .filter(|(_, a)| a.0 > 0)
        .map(|(id, a)| ComponentStats {
            id: id as u32,
            pixel_count: a.0,
            bounds: (a.3, a.4, a.5, a.6),
            centroid: (a.1 as f64 / a.0 as f64, a.2 as f64 / a.0 as f64),
        })
        .collect()
}

/// Ids of regions with at least `min_size` pixels, ascending
pub fn qualifying_regions(labels: &LabelMap, min_size: u32) -> Vec<u32> {
    region_stats(labels)
        .iter()
        .filter(|s| s.pixel_count >= min_size)
        .map(|s| s.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label_regions;

    #[test]
    fn test_despeckle_removes_dots_keeps_lines() {
        let mask = WallMask::from_ascii(&[
            "#.........",
            "..........",
            "..#####...",
            "..........",
            "........##",
        ])
        .unwrap();
        let result = remove_small_wall_components(&mask, 3).unwrap();
        assert_eq!(result.components_removed, 2);
        assert_eq!(result.pixels_removed, 3);
        assert_eq!(result.mask.count_walls(), 5);
    }

    #[test]
    fn test_diagonal_walls_are_separate_components() {
        let mask = WallMask::from_ascii(&["#..", ".#.", "..#"]).unwrap();
        let result = remove_small_wall_components(&mask, 2).unwrap();
        assert_eq!(result.components_removed, 3);
        assert_eq!(result.mask.count_walls(), 0);
    }

    #[test]
    fn test_absorb_small_regions() {
        let mask = WallMask::from_ascii(&["..#.", "..#.", "####", "..#."]).unwrap();
        let labels = label_regions(&mask).unwrap();
        let (out, absorbed) = absorb_small_regions(&mask, &labels, 3).unwrap();
        // regions of size 2, 1 and 2 are absorbed; the 4-pixel one stays
        assert_eq!(absorbed, 3);
        assert_eq!(out.to_ascii(), vec!["..##", "..##", "####", "####"]);
    }

    #[test]
    fn test_region_stats() {
        let mask = WallMask::from_ascii(&[".#..", "####", ".#..", ".#.."]).unwrap();
        let labels = label_regions(&mask).unwrap();
        let stats = region_stats(&labels);
        assert_eq!(stats.len(), 4);
        assert_eq!(stats[3].pixel_count, 4);
        assert_eq!(stats[3].bounds, (2, 2, 3, 3));
        assert_eq!(stats[3].centroid, (2.5, 2.5));
        assert_eq!(qualifying_regions(&labels, 2), vec![2, 3, 4]);
    }
}
