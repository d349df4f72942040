//! LabelMap - per-pixel region ids
//!
//! Region id `0` is reserved for wall pixels. Every non-zero id names one
//! maximal 4-connected fillable component. Ids are dense in
//! `1..=max_region_id` and are assigned in raster-scan discovery order by
//! the labeler, so a saved region-color map stays valid when the same mask
//! is labeled again.

use crate::error::{Error, Result};
use crate::raster::check_dimensions;

/// Region id reserved for walls
pub const WALL_REGION: u32 = 0;

/// Flat region-id map with the largest assigned id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    width: u32,
    height: u32,
    labels: Vec<u32>,
    max_region_id: u32,
}

impl LabelMap {
    /// Wrap a label buffer. `max_region_id` is recomputed from the data.
    pub fn from_vec(width: u32, height: u32, labels: Vec<u32>) -> Result<Self> {
        check_dimensions(width, height)?;
        let expected = width as usize * height as usize;
        if labels.len() != expected {
            return Err(Error::BufferSizeMismatch {
                expected,
                actual: labels.len(),
            });
        }
        let max_region_id = labels.iter().copied().max().unwrap_or(0);
        Ok(Self {
            width,
            height,
            labels,
            max_region_id,
        })
    }

    /// Label map width
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Label map height
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Largest region id present (0 when the canvas is all wall)
    pub fn max_region_id(&self) -> u32 {
        self.max_region_id
    }

    /// Raw labels, row-major
    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    /// Consume the map and return its buffer.
    pub fn into_labels(self) -> Vec<u32> {
        self.labels
    }

    /// Region id at `(x, y)`, or `None` outside the canvas.
    #[inline]
    pub fn region_at(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.labels[y as usize * self.width as usize + x as usize])
    }

    /// Pixel count per region, indexed by id (index 0 counts walls).
    pub fn region_sizes(&self) -> Vec<u32> {
        let mut sizes = vec![0u32; self.max_region_id as usize + 1];
        for &l in &self.labels {
            sizes[l as usize] += 1;
        }
        sizes
    }

    /// Count of non-wall regions
    pub fn region_count(&self) -> u32 {
        self.max_region_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_region_recomputed() {
        let map = LabelMap::from_vec(3, 1, vec![0, 2, 1]).unwrap();
        assert_eq!(map.max_region_id(), 2);
        assert_eq!(map.region_at(1, 0), Some(2));
        assert_eq!(map.region_at(3, 0), None);
    }

    #[test]
    fn test_region_sizes() {
        let map = LabelMap::from_vec(2, 2, vec![0, 1, 1, 2]).unwrap();
        assert_eq!(map.region_sizes(), vec![1, 2, 1]);
    }

    #[test]
    fn test_length_checked() {
        assert!(LabelMap::from_vec(2, 2, vec![0; 3]).is_err());
    }
}
