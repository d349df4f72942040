//! Walls along color boundaries
//!
//! Catches boundaries the illustration draws with a change of color rather
//! than an outline. Any horizontally or vertically adjacent pair whose RGB
//! distance exceeds the threshold turns into wall on both sides.

use crate::error::MaskResult;
use log::debug;
use tintmap_core::config::ColorEdgeParams;
use tintmap_core::{RasterImage, WallMask};
use tintmap_morph::dilate_disk;

/// Mask of pixels that sit on a strong color edge
pub fn color_edge_mask(raster: &RasterImage, min_delta: f64) -> MaskResult<WallMask> {
    let (w, h) = (raster.width() as usize, raster.height() as usize);
    let mut data = vec![0u8; w * h];
    let limit = min_delta * min_delta;

    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            let c = raster.rgb_at_index(i);
            if x + 1 < w && c.distance_sq(raster.rgb_at_index(i + 1)) as f64 > limit {
                data[i] = 1;
                data[i + 1] = 1;
            }
            if y + 1 < h && c.distance_sq(raster.rgb_at_index(i + w)) as f64 > limit {
                data[i] = 1;
                data[i + w] = 1;
            }
        }
    }
    Ok(WallMask::from_vec(raster.width(), raster.height(), data)?)
}

/// Merge color-edge walls into `mask`, returning how many pixels were added
pub fn insert_color_edge_walls(
    mask: &mut WallMask,
    raster: &RasterImage,
    params: &ColorEdgeParams,
) -> MaskResult<usize> {
    if !params.enabled {
        return Ok(0);
    }
    mask.check_same_size(raster.width(), raster.height())?;
    let edges = color_edge_mask(raster, params.min_color_delta_l2)?;
    let edges = dilate_disk(&edges, params.dilate_px)?;
    let before = mask.count_walls();
    mask.union_with(&edges)?;
    let added = mask.count_walls() - before;
    debug!("color_edge_walls: {} pixels added", added);
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tintmap_core::Rgb;

    #[test]
    fn test_edge_between_two_fields() {
        let raster = RasterImage::filled(6, 2, Rgb::new(250, 0, 0))
            .unwrap()
            .with_pixel(3, 0, Rgb::new(0, 0, 250))
            .with_pixel(4, 0, Rgb::new(0, 0, 250))
            .with_pixel(5, 0, Rgb::new(0, 0, 250))
            .with_pixel(3, 1, Rgb::new(0, 0, 250))
            .with_pixel(4, 1, Rgb::new(0, 0, 250))
            .with_pixel(5, 1, Rgb::new(0, 0, 250));
        let edges = color_edge_mask(&raster, 60.0).unwrap();
        assert_eq!(edges.to_ascii(), vec!["..##..", "..##.."]);
    }

    #[test]
    fn test_small_delta_is_ignored() {
        let raster = RasterImage::filled(4, 1, Rgb::new(100, 100, 100))
            .unwrap()
            .with_pixel(2, 0, Rgb::new(120, 120, 120));
        let edges = color_edge_mask(&raster, 60.0).unwrap();
        assert_eq!(edges.count_walls(), 0);
    }

    #[test]
    fn test_disabled_adds_nothing() {
        let raster = RasterImage::filled(4, 4, Rgb::WHITE)
            .unwrap()
            .with_pixel(1, 1, Rgb::BLACK);
        let mut mask = WallMask::new(4, 4).unwrap();
        let params = ColorEdgeParams::default();
        assert_eq!(insert_color_edge_walls(&mut mask, &raster, &params).unwrap(), 0);
        let params = ColorEdgeParams {
            enabled: true,
            ..Default::default()
        };
        assert_eq!(insert_color_edge_walls(&mut mask, &raster, &params).unwrap(), 5);
    }
}
