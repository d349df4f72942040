//! Binary morphological operations
//!
//! Implements erosion, dilation, opening, and closing for wall masks.
//!
//! Pixels outside the canvas never take part: dilation cannot pull walls
//! in from beyond the edge and erosion does not treat the edge as
//! background. With a symmetric SEL this keeps closing extensive (every
//! input wall survives) and opening anti-extensive.

use crate::{MorphResult, Sel};
use tintmap_core::WallMask;

/// Dilate a wall mask
///
/// Every wall pixel stamps the SEL's hits around itself.
pub fn dilate(mask: &WallMask, sel: &Sel) -> MorphResult<WallMask> {
    let (w, h) = (mask.width() as i32, mask.height() as i32);
    let offsets: Vec<(i32, i32)> = sel.hit_offsets().collect();
    let src = mask.data();
    let mut out = vec![0u8; src.len()];

    for y in 0..h {
        let row = (y * w) as usize;
        for x in 0..w {
            if src[row + x as usize] == 0 {
                continue;
            }
            for &(dx, dy) in &offsets {
                let nx = x + dx;
                let ny = y + dy;
                if nx >= 0 && ny >= 0 && nx < w && ny < h {
                    out[(ny * w + nx) as usize] = 1;
                }
            }
        }
    }

    Ok(WallMask::from_vec(mask.width(), mask.height(), out)?)
}

/// Erode a wall mask
///
/// A wall pixel survives only if every in-canvas SEL hit around it is a
/// wall.
pub fn erode(mask: &WallMask, sel: &Sel) -> MorphResult<WallMask> {
    let (w, h) = (mask.width() as i32, mask.height() as i32);
    let offsets: Vec<(i32, i32)> = sel.hit_offsets().collect();
    let src = mask.data();
    let mut out = vec![0u8; src.len()];

    for y in 0..h {
        let row = (y * w) as usize;
        for x in 0..w {
            if src[row + x as usize] == 0 {
                continue;
            }
            let keep = offsets.iter().all(|&(dx, dy)| {
                let nx = x + dx;
                let ny = y + dy;
                nx < 0 || ny < 0 || nx >= w || ny >= h || src[(ny * w + nx) as usize] != 0
            });
            if keep {
                out[row + x as usize] = 1;
            }
        }
    }

    Ok(WallMask::from_vec(mask.width(), mask.height(), out)?)
}

/// Open a wall mask (erode, then dilate)
///
/// Removes wall features smaller than the SEL.
pub fn open(mask: &WallMask, sel: &Sel) -> MorphResult<WallMask> {
    let eroded = erode(mask, sel)?;
    dilate(&eroded, sel)
}

/// Close a wall mask (dilate, then erode)
///
/// Bridges gaps in walls narrower than the SEL.
pub fn close(mask: &WallMask, sel: &Sel) -> MorphResult<WallMask> {
    let dilated = dilate(mask, sel)?;
    erode(&dilated, sel)
}

/// Dilate with a disk of the given radius; radius 0 returns a copy
pub fn dilate_disk(mask: &WallMask, radius: u32) -> MorphResult<WallMask> {
    if radius == 0 {
        return Ok(mask.clone());
    }
    dilate(mask, &Sel::create_disk(radius)?)
}

/// Erode with a disk of the given radius; radius 0 returns a copy
pub fn erode_disk(mask: &WallMask, radius: u32) -> MorphResult<WallMask> {
    if radius == 0 {
        return Ok(mask.clone());
    }
    erode(mask, &Sel::create_disk(radius)?)
}

/// Open with a disk of the given radius; radius 0 returns a copy
pub fn open_disk(mask: &WallMask, radius: u32) -> MorphResult<WallMask> {
    if radius == 0 {
        return Ok(mask.clone());
    }
    open(mask, &Sel::create_disk(radius)?)
}

/// Close with a disk of the given radius; radius 0 returns a copy
pub fn close_disk(mask: &WallMask, radius: u32) -> MorphResult<WallMask> {
    if radius == 0 {
        return Ok(mask.clone());
    }
    close(mask, &Sel::create_disk(radius)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot_mask() -> WallMask {
        WallMask::from_ascii(&[".....", ".....", "..#..", ".....", "....."]).unwrap()
    }

    #[test]
    fn test_dilate_disk1_is_plus() {
        let out = dilate_disk(&dot_mask(), 1).unwrap();
        assert_eq!(
            out.to_ascii(),
            vec![".....", "..#..", ".###.", "..#..", "....."]
        );
    }

    #[test]
    fn test_erode_removes_isolated_dot() {
        let out = erode_disk(&dot_mask(), 1).unwrap();
        assert_eq!(out.count_walls(), 0);
    }

    #[test]
    fn test_erode_keeps_edge_walls() {
        // the canvas edge counts as neither wall nor background
        let mask = WallMask::from_ascii(&["##.", "##.", "##."]).unwrap();
        let out = erode_disk(&mask, 1).unwrap();
        assert_eq!(out.to_ascii(), vec!["#..", "#..", "#.."]);
    }

    #[test]
    fn test_close_bridges_gap() {
        let mask =
            WallMask::from_ascii(&["......", "##.###", "##.###", "##.###", "......"]).unwrap();
        let out = close_disk(&mask, 1).unwrap();
        assert!(out.is_wall(2, 2));
        // closing is extensive
        for (a, b) in mask.data().iter().zip(out.data()) {
            assert!(*b >= *a);
        }
    }

    #[test]
    fn test_open_removes_thin_line() {
        let mask =
            WallMask::from_ascii(&[".......", ".###...", ".######", ".###...", "......."]).unwrap();
        let out = open_disk(&mask, 1).unwrap();
        assert!(out.is_wall(2, 2));
        assert!(!out.is_wall(5, 2));
        assert!(!out.is_wall(6, 2));
    }

    #[test]
    fn test_radius_zero_is_identity() {
        let mask = dot_mask();
        assert_eq!(close_disk(&mask, 0).unwrap(), mask);
        assert_eq!(open_disk(&mask, 0).unwrap(), mask);
    }
}
