//! Structuring Element (SEL) for morphological operations
//!
//! A structuring element defines the neighborhood used in morphological
//! operations. Only hits are modeled; wall masks never need hit-miss
//! transforms.

use crate::{MorphError, MorphResult};

/// Largest radius accepted by [`Sel::create_disk`]
pub const MAX_DISK_RADIUS: u32 = 64;

/// Structuring Element (SEL)
///
/// A `width`×`width` grid of hit flags with its origin at (cx, cy).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sel {
    width: u32,
    cx: u32,
    cy: u32,
    data: Vec<bool>,
}

impl Sel {
    /// Create a disk of the given radius centered on its origin
    ///
    /// A cell (dx, dy) is a hit when `dx² + dy² <= radius²`. Radius 0 gives
    /// a single-pixel SEL, which makes every operation an identity.
    pub fn create_disk(radius: u32) -> MorphResult<Self> {
        if radius > MAX_DISK_RADIUS {
            return Err(MorphError::InvalidSel(format!(
                "disk radius {} exceeds {}",
                radius, MAX_DISK_RADIUS
            )));
        }
        let size = 2 * radius + 1;
        let r = radius as i64;
        let mut data = Vec::with_capacity((size * size) as usize);
        for dy in -r..=r {
            for dx in -r..=r {
                data.push(dx * dx + dy * dy <= r * r);
            }
        }
        Ok(Self {
            width: size,
            cx: radius,
            cy: radius,
            data,
        })
    }

    /// Offsets of hit elements relative to the origin
    pub fn hit_offsets(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let (w, cx, cy) = (self.width, self.cx as i32, self.cy as i32);
        self.data.iter().enumerate().filter(|(_, h)| **h).map(move |(i, _)| {
            let x = (i as u32 % w) as i32;
            let y = (i as u32 / w) as i32;
            (x - cx, y - cy)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_shapes() {
        assert_eq!(Sel::create_disk(0).unwrap().hit_offsets().count(), 1);
        // radius 1: plus shape
        assert_eq!(Sel::create_disk(1).unwrap().hit_offsets().count(), 5);
        // radius 2: 13 cells
        assert_eq!(Sel::create_disk(2).unwrap().hit_offsets().count(), 13);
        assert!(Sel::create_disk(MAX_DISK_RADIUS + 1).is_err());
    }

    #[test]
    fn test_disk_offsets_are_centered() {
        let offsets: Vec<_> = Sel::create_disk(1).unwrap().hit_offsets().collect();
        assert_eq!(offsets, vec![(0, -1), (-1, 0), (0, 0), (1, 0), (0, 1)]);
    }
}
