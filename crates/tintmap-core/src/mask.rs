//! WallMask - binary wall/fillable classification
//!
//! One byte per pixel, row-major. `1` marks a wall (outline) pixel that can
//! never be filled; `0` marks a fillable pixel. Any other value is
//! normalized to `1` on construction.

use crate::error::{Error, Result};
use crate::raster::check_dimensions;

/// Binary wall mask, length `width * height`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallMask {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl WallMask {
    /// Create an all-fillable mask.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0; width as usize * height as usize],
        })
    }

    /// Wrap an existing buffer, normalizing non-zero bytes to `1`.
    pub fn from_vec(width: u32, height: u32, mut data: Vec<u8>) -> Result<Self> {
        check_dimensions(width, height)?;
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(Error::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        for v in data.iter_mut() {
            *v = u8::from(*v != 0);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a mask from a per-pixel predicate.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Result<Self> {
        check_dimensions(width, height)?;
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(u8::from(f(x, y)));
            }
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Parse a mask from text rows: `#` is a wall, anything else is fillable.
    ///
    /// ```
    /// use tintmap_core::WallMask;
    ///
    /// let mask = WallMask::from_ascii(&["..#..", "#####", "..#.."]).unwrap();
    /// assert_eq!(mask.width(), 5);
    /// assert!(mask.is_wall(2, 0));
    /// assert!(!mask.is_wall(0, 0));
    /// ```
    pub fn from_ascii(rows: &[&str]) -> Result<Self> {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, |r| r.chars().count()) as u32;
        check_dimensions(width, height)?;
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for row in rows {
            let n = row.chars().count() as u32;
            if n != width {
                return Err(Error::DimensionMismatch {
                    expected: (width, height),
                    actual: (n, height),
                });
            }
            data.extend(row.chars().map(|c| u8::from(c == '#')));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Mask width
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Mask height
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false; masks are never empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw 0/1 bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw bytes. Callers must only write `0` or `1`.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the mask and return its buffer.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Wall test at `(x, y)`. Out-of-canvas coordinates are not walls.
    #[inline]
    pub fn is_wall(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.data[self.index(x, y)] != 0
    }

    /// Wall test with signed coordinates; out-of-canvas is not a wall.
    #[inline]
    pub fn is_wall_signed(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && self.is_wall(x as u32, y as u32)
    }

    /// Wall test at a flat index
    #[inline]
    pub fn is_wall_at(&self, index: usize) -> bool {
        self.data[index] != 0
    }

    /// Set or clear a wall pixel; out-of-canvas writes are ignored.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, wall: bool) {
        if x < self.width && y < self.height {
            let i = self.index(x, y);
            self.data[i] = u8::from(wall);
        }
    }

    /// Set a wall pixel from signed coordinates; out-of-canvas writes are ignored.
    #[inline]
    pub fn set_signed(&mut self, x: i32, y: i32, wall: bool) {
        if x >= 0 && y >= 0 {
            self.set(x as u32, y as u32, wall);
        }
    }

    /// Flat index of `(x, y)`
    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Number of wall pixels
    pub fn count_walls(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// In-place union with another mask of the same size.
    pub fn union_with(&mut self, other: &WallMask) -> Result<()> {
        self.check_same_size(other.width, other.height)?;
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a |= *b;
        }
        Ok(())
    }

    /// Ensure another buffer is registered 1:1 with this mask.
    pub fn check_same_size(&self, width: u32, height: u32) -> Result<()> {
        if width != self.width || height != self.height {
            return Err(Error::DimensionMismatch {
                expected: (self.width, self.height),
                actual: (width, height),
            });
        }
        Ok(())
    }

    /// Render the mask as text rows (`#` for walls, `.` otherwise).
    pub fn to_ascii(&self) -> Vec<String> {
        self.data
            .chunks_exact(self.width as usize)
            .map(|row| row.iter().map(|&v| if v != 0 { '#' } else { '.' }).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec_normalizes() {
        let mask = WallMask::from_vec(2, 2, vec![0, 7, 255, 0]).unwrap();
        assert_eq!(mask.data(), &[0, 1, 1, 0]);
        assert_eq!(mask.count_walls(), 2);
    }

    #[test]
    fn test_ascii_roundtrip() {
        let rows = ["#..", ".#.", "..#"];
        let mask = WallMask::from_ascii(&rows).unwrap();
        assert_eq!(mask.to_ascii(), rows);
    }

    #[test]
    fn test_ragged_ascii_rejected() {
        assert!(WallMask::from_ascii(&["##", "###"]).is_err());
        assert!(WallMask::from_ascii(&[]).is_err());
    }

    #[test]
    fn test_out_of_bounds_is_not_wall() {
        let mut mask = WallMask::new(3, 3).unwrap();
        mask.set(5, 5, true);
        mask.set_signed(-1, 0, true);
        assert_eq!(mask.count_walls(), 0);
        assert!(!mask.is_wall_signed(-1, 2));
    }

    #[test]
    fn test_union_size_check() {
        let mut a = WallMask::new(3, 3).unwrap();
        let b = WallMask::new(4, 3).unwrap();
        assert!(a.union_with(&b).is_err());
    }
}
