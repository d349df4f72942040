//! Drawing walls into a mask

use tintmap_core::WallMask;

/// Rasterize a line with Bresenham's algorithm
///
/// Both endpoints are included. Points that fall outside the canvas are
/// skipped. Returns the number of pixels that were not walls before.
pub fn draw_line(mask: &mut WallMask, x0: i32, y0: i32, x1: i32, y1: i32) -> usize {
    let (w, h) = (mask.width() as i32, mask.height() as i32);
    let mut added = 0;
    for (x, y) in line_points(x0, y0, x1, y1) {
        if x < 0 || y < 0 || x >= w || y >= h {
            continue;
        }
        if !mask.is_wall(x as u32, y as u32) {
            mask.set(x as u32, y as u32, true);
            added += 1;
        }
    }
    added
}

/// Points of a Bresenham line, endpoints included
pub fn line_points(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<(i32, i32)> {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);
    let mut points = Vec::with_capacity(dx.max(-dy) as usize + 1);

    loop {
        points.push((x, y));
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    points
}

/// Stamp a solid wall frame `width` pixels wide around the canvas
pub fn stamp_border(mask: &mut WallMask, width: u32) {
    if width == 0 {
        return;
    }
    let (w, h) = mask.dimensions();
    for y in 0..h {
        for x in 0..w {
            if x < width || y < width || x + width >= w || y + width >= h {
                mask.set(x, y, true);
            }
        }
    }
}
