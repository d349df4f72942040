//! Synthetic fixtures
//!
//! Line-art rasters and masks built in memory so regression tests need no
//! image files on disk.

use crate::error::{TestError, TestResult};
use tintmap_core::{RasterImage, Rgb, WallMask};

/// 4×4 mask whose plus-shaped wall separates four quadrants.
///
/// Row-major discovery labels the quadrants top-left, top-right,
/// bottom-left, bottom-right as 1, 2, 3, 4.
pub fn plus_mask() -> TestResult<WallMask> {
    Ok(WallMask::from_ascii(&[".#..", "####", ".#..", ".#.."])?)
}

/// White raster with a black grid of `cols`×`rows` cells.
///
/// Each cell is `cell`×`cell` pixels and every line, including the outer
/// frame, is `line` pixels wide.
pub fn outlined_grid(cols: u32, rows: u32, cell: u32, line: u32) -> TestResult<RasterImage> {
    if cols == 0 || rows == 0 || cell == 0 {
        return Err(TestError::Fixture {
            name: "outlined_grid".into(),
            message: format!("degenerate grid {}x{} cell {}", cols, rows, cell),
        });
    }
    let pitch = cell + line;
    let width = cols * pitch + line;
    let height = rows * pitch + line;
    let mask = WallMask::from_fn(width, height, |x, y| x % pitch < line || y % pitch < line)?;
    mask_to_raster(&mask)
}

/// White `size`×`size` raster with a 1-pixel black square outline inset by
/// `inset`, broken by a `gap`-pixel opening centered on the top edge.
pub fn gapped_rectangle(size: u32, inset: u32, gap: u32) -> TestResult<RasterImage> {
    if size < 2 * inset + 3 || gap + 2 > size - 2 * inset {
        return Err(TestError::Fixture {
            name: "gapped_rectangle".into(),
            message: format!("size {} cannot hold inset {} gap {}", size, inset, gap),
        });
    }
    let lo = inset;
    let hi = size - 1 - inset;
    let mid = size / 2;
    let gap_start = mid - gap / 2;
    let gap_end = gap_start + gap;
    let mask = WallMask::from_fn(size, size, |x, y| {
        let inside = (lo..=hi).contains(&x) && (lo..=hi).contains(&y);
        let on_edge = inside && (x == lo || x == hi || y == lo || y == hi);
        let in_gap = y == lo && x >= gap_start && x < gap_end;
        on_edge && !in_gap
    })?;
    mask_to_raster(&mask)
}

/// Vertical stripes, one per color, with no outlines at all.
pub fn color_fields(stripe_width: u32, height: u32, colors: &[Rgb]) -> TestResult<RasterImage> {
    let width = stripe_width * colors.len() as u32;
    let mut data = Vec::with_capacity(width as usize * height as usize * 4);
    for _ in 0..height {
        for &c in colors {
            for _ in 0..stripe_width {
                data.extend_from_slice(&c.to_rgba());
            }
        }
    }
    Ok(RasterImage::from_rgba(width, height, data)?)
}

/// Render a mask as line art: walls black, fillable pixels white.
pub fn mask_to_raster(mask: &WallMask) -> TestResult<RasterImage> {
    let mut data = Vec::with_capacity(mask.len() * 4);
    for &v in mask.data() {
        let c = if v != 0 { Rgb::BLACK } else { Rgb::WHITE };
        data.extend_from_slice(&c.to_rgba());
    }
    Ok(RasterImage::from_rgba(mask.width(), mask.height(), data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outlined_grid_geometry() {
        let img = outlined_grid(3, 2, 10, 2).unwrap();
        assert_eq!(img.width(), 3 * 12 + 2);
        assert_eq!(img.height(), 2 * 12 + 2);
        assert_eq!(img.rgb(0, 0), Some(Rgb::BLACK));
        assert_eq!(img.rgb(5, 5), Some(Rgb::WHITE));
        assert_eq!(img.rgb(12, 5), Some(Rgb::BLACK));
    }

    #[test]
    fn test_gapped_rectangle_has_gap() {
        let img = gapped_rectangle(20, 3, 4).unwrap();
        assert_eq!(img.rgb(3, 3), Some(Rgb::BLACK));
        assert_eq!(img.rgb(10, 3), Some(Rgb::WHITE));
        assert_eq!(img.rgb(16, 10), Some(Rgb::BLACK));
        assert!(gapped_rectangle(5, 3, 1).is_err());
    }

    #[test]
    fn test_plus_mask() {
        let mask = plus_mask().unwrap();
        assert_eq!(mask.count_walls(), 7);
    }
}
