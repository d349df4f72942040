//! Endpoint bridging
//!
//! An endpoint is a wall pixel with exactly one wall pixel among its eight
//! neighbors. Its outward direction points away from that neighbor. Two
//! endpoints facing each other across a short gap get joined by a
//! Bresenham line.
//!
//! Matching is greedy and deterministic. Endpoints are visited in
//! row-major order; each one tries its unused partners nearest first
//! (ties go to the earlier endpoint) and takes the first that passes the
//! angle test on both ends. Every endpoint joins at most one bridge.

use crate::error::MaskResult;
use log::debug;
use std::collections::HashMap;
use tintmap_core::WallMask;
use tintmap_core::config::EndpointBridgeParams;
use tintmap_morph::draw_line;

/// A line end with its outward unit direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Endpoint {
    pub x: i32,
    pub y: i32,
    pub dir: (f64, f64),
}

/// An accepted bridge between two endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bridge {
    pub from: (i32, i32),
    pub to: (i32, i32),
}

/// Result of [`bridge_endpoints`]
#[derive(Debug, Clone, Default)]
pub struct BridgeReport {
    /// Number of endpoints found before bridging
    pub endpoints: usize,
    /// Bridges drawn, in acceptance order
    pub bridges: Vec<Bridge>,
}

/// Find all line endpoints in row-major order
pub fn find_endpoints(mask: &WallMask) -> Vec<Endpoint> {
    let (w, h) = (mask.width() as i32, mask.height() as i32);
    let mut endpoints = Vec::new();

    for y in 0..h {
        for x in 0..w {
            if !mask.is_wall(x as u32, y as u32) {
                continue;
            }
            let mut count = 0;
            let (mut sx, mut sy) = (0i32, 0i32);
            for dy in -1..=1 {
                for dx in -1..=1 {
                    if (dx, dy) != (0, 0) && mask.is_wall_signed(x + dx, y + dy) {
                        count += 1;
                        sx += dx;
                        sy += dy;
                    }
                }
            }
            if count != 1 {
                continue;
            }
            let len = ((sx * sx + sy * sy) as f64).sqrt();
            endpoints.push(Endpoint {
                x,
                y,
                dir: (-sx as f64 / len, -sy as f64 / len),
            });
        }
    }
    endpoints
}

/// Bridge budget for a `width`×`height` canvas
pub fn bridge_budget(params: &EndpointBridgeParams, width: u32, height: u32) -> usize {
    let megapixels = width as f64 * height as f64 / 1e6;
    let budget = (params.max_bridges_per_megapixel * megapixels).ceil();
    if budget.is_finite() && budget > 0.0 {
        budget as usize
    } else {
        0
    }
}

/// Join facing endpoints across short gaps, in place
pub fn bridge_endpoints(
    mask: &mut WallMask,
    params: &EndpointBridgeParams,
) -> MaskResult<BridgeReport> {
    let endpoints = find_endpoints(mask);
    let mut report = BridgeReport {
        endpoints: endpoints.len(),
        bridges: Vec::new(),
    };

    let budget = bridge_budget(params, mask.width(), mask.height());
    let max_d = params.max_endpoint_distance_px;
    if !params.enabled || budget == 0 || endpoints.len() < 2 || max_d < 2.0 {
        return Ok(report);
    }
    let min_cos = params.angle_limit_degrees.to_radians().cos();

    // bucket endpoints on a grid whose cell is at least the search radius
    let cell = max_d.ceil().max(1.0) as i32;
    let mut grid: HashMap<(i32, i32), Vec<usize>> = HashMap::new();
    for (i, ep) in endpoints.iter().enumerate() {
        grid.entry((ep.x / cell, ep.y / cell)).or_default().push(i);
    }

    let mut used = vec![false; endpoints.len()];
    let mut candidates: Vec<(f64, usize)> = Vec::new();

    for i in 0..endpoints.len() {
        if report.bridges.len() >= budget {
            break;
        }
        if used[i] {
            continue;
        }
        let a = endpoints[i];
        candidates.clear();
        let (cx, cy) = (a.x / cell, a.y / cell);
        for gy in cy - 1..=cy + 1 {
            for gx in cx - 1..=cx + 1 {
                let Some(bucket) = grid.get(&(gx, gy)) else {
                    continue;
                };
                for &j in bucket {
                    if j == i || used[j] {
                        continue;
                    }
                    let b = endpoints[j];
                    let d = (((b.x - a.x).pow(2) + (b.y - a.y).pow(2)) as f64).sqrt();
                    if (2.0..=max_d).contains(&d) {
                        candidates.push((d, j));
                    }
                }
            }
        }
        candidates.sort_by(|p, q| p.0.total_cmp(&q.0).then(p.1.cmp(&q.1)));

        for &(d, j) in &candidates {
            let b = endpoints[j];
            let v = ((b.x - a.x) as f64 / d, (b.y - a.y) as f64 / d);
            let out_a = a.dir.0 * v.0 + a.dir.1 * v.1;
            let out_b = -(b.dir.0 * v.0 + b.dir.1 * v.1);
            if out_a >= min_cos && out_b >= min_cos {
                draw_line(mask, a.x, a.y, b.x, b.y);
                used[i] = true;
                used[j] = true;
                report.bridges.push(Bridge {
                    from: (a.x, a.y),
                    to: (b.x, b.y),
                });
                break;
            }
        }
    }

    debug!(
        "bridge_endpoints: {} endpoints, {} bridges (budget {})",
        report.endpoints,
        report.bridges.len(),
        budget
    );
    Ok(report)
}
