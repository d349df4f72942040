//! Skeletonization by Zhang-Suen thinning
//!
//! Reduces wall strokes to 1-pixel wide skeletons. Each round runs two
//! sub-iterations over the whole mask; a sub-iteration first collects every
//! deletable pixel and only then clears them, so a pass never sees its own
//! deletions. Rounds repeat until a round removes nothing.
//!
//! # Neighborhood
//!
//! ```text
//!   P9 P2 P3
//!   P8 P1 P4
//!   P7 P6 P5
//! ```
//!
//! Pixels outside the canvas count as background.

use crate::MorphResult;
use log::debug;
use tintmap_core::WallMask;

/// Offsets of P2..P9, clockwise from north
const NEIGHBORS: [(i32, i32); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

/// Which half of a Zhang-Suen round is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubIteration {
    First,
    Second,
}

/// Thin a wall mask to a 1-pixel skeleton
pub fn zhang_suen(mask: &WallMask) -> MorphResult<WallMask> {
    let mut out = mask.clone();
    let mut rounds = 0u32;
    let mut removed_total = 0usize;
    let mut marked = Vec::new();

    loop {
        rounds += 1;
        let mut removed = 0;
        for step in [SubIteration::First, SubIteration::Second] {
            collect_deletable(&out, step, &mut marked);
            removed += marked.len();
            let data = out.data_mut();
            for &i in &marked {
                data[i] = 0;
            }
        }
        removed_total += removed;
        if removed == 0 {
            break;
        }
    }

    debug!(
        "zhang_suen: {} rounds, {} pixels removed, {} remain",
        rounds,
        removed_total,
        out.count_walls()
    );
    Ok(out)
}

fn collect_deletable(mask: &WallMask, step: SubIteration, marked: &mut Vec<usize>) {
    marked.clear();
    let (w, h) = (mask.width() as i32, mask.height() as i32);

    for y in 0..h {
        for x in 0..w {
            if !mask.is_wall(x as u32, y as u32) {
                continue;
            }
            let mut p = [false; 8];
            for (k, &(dx, dy)) in NEIGHBORS.iter().enumerate() {
                p[k] = mask.is_wall_signed(x + dx, y + dy);
            }

            let b = p.iter().filter(|&&v| v).count();
            if !(2..=6).contains(&b) {
                continue;
            }

            let a = (0..8).filter(|&k| !p[k] && p[(k + 1) % 8]).count();
            if a != 1 {
                continue;
            }

            // p[0]=P2 p[2]=P4 p[4]=P6 p[6]=P8
            let (p2, p4, p6, p8) = (p[0], p[2], p[4], p[6]);
            let ok = match step {
                SubIteration::First => !(p2 && p4 && p6) && !(p4 && p6 && p8),
                SubIteration::Second => !(p2 && p4 && p8) && !(p2 && p6 && p8),
            };
            if ok {
                marked.push(mask.index(x as u32, y as u32));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thick_bar_becomes_line() {
        let mask = WallMask::from_fn(20, 7, |x, y| (2..18).contains(&x) && (1..6).contains(&y))
            .unwrap();
        let out = zhang_suen(&mask).unwrap();
        assert!(out.count_walls() > 0);
        assert!(out.count_walls() < mask.count_walls() / 3);
        // away from the ends the skeleton is one pixel tall
        for x in 6..14 {
            let column = (0..7).filter(|&y| out.is_wall(x, y)).count();
            assert!(column <= 1, "column {} has {} pixels", x, column);
        }
    }

    #[test]
    fn test_single_line_is_stable() {
        let mask = WallMask::from_ascii(&[".......", ".#####.", "......."]).unwrap();
        let out = zhang_suen(&mask).unwrap();
        // interior of a 1-px line has A=2 and is never deleted
        for x in 2..5 {
            assert!(out.is_wall(x, 1));
        }
    }

    #[test]
    fn test_isolated_pixel_survives() {
        let mask = WallMask::from_ascii(&["...", ".#.", "..."]).unwrap();
        assert_eq!(zhang_suen(&mask).unwrap(), mask);
    }

    #[test]
    fn test_idempotent() {
        let mask = WallMask::from_fn(16, 16, |x, y| {
            let (dx, dy) = (x as i32 - 8, y as i32 - 8);
            dx * dx + dy * dy <= 36
        })
        .unwrap();
        let once = zhang_suen(&mask).unwrap();
        let twice = zhang_suen(&once).unwrap();
        assert_eq!(once, twice);
    }
}
