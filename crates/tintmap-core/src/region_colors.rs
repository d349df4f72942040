//! RegionColorMap - the authoritative coloring state
//!
//! A sparse `region id -> color` mapping. Only fill and erase mutate it; the
//! compositor reads it through [`RegionColorMap::palette_texels`], which lays
//! colors out so that texel index equals region id.

use crate::color::Rgb;
use crate::labels::WALL_REGION;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Color shown for regions that have not been filled yet
pub const UNFILLED_COLOR: Rgb = Rgb::WHITE;

/// Color of the reserved wall texel (index 0)
pub const WALL_COLOR: Rgb = Rgb::BLACK;

/// Sparse region-id to color mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionColorMap {
    colors: BTreeMap<u32, Rgb>,
}

impl RegionColorMap {
    /// Empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a color; returns the previous color, if any.
    ///
    /// The wall region can never be colored; such calls are ignored.
    pub fn set(&mut self, region_id: u32, color: Rgb) -> Option<Rgb> {
        if region_id == WALL_REGION {
            return None;
        }
        self.colors.insert(region_id, color)
    }

    /// Remove a color; returns the removed color, if any.
    pub fn remove(&mut self, region_id: u32) -> Option<Rgb> {
        self.colors.remove(&region_id)
    }

    /// Color of a region
    pub fn get(&self, region_id: u32) -> Option<Rgb> {
        self.colors.get(&region_id).copied()
    }

    /// Whether the region has a color
    pub fn contains(&self, region_id: u32) -> bool {
        self.colors.contains_key(&region_id)
    }

    /// Number of colored regions
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// True when nothing is colored
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Iterate `(region id, color)` in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, Rgb)> + '_ {
        self.colors.iter().map(|(&id, &c)| (id, c))
    }

    /// RGBA8 lookup table of `max_region_id + 1` texels.
    ///
    /// Texel 0 is the wall color, uncolored regions get [`UNFILLED_COLOR`],
    /// and ids above `max_region_id` are skipped.
    pub fn palette_texels(&self, max_region_id: u32) -> Vec<u8> {
        let n = max_region_id as usize + 1;
        let mut texels = Vec::with_capacity(n * 4);
        texels.extend_from_slice(&WALL_COLOR.to_rgba());
        let fill = UNFILLED_COLOR.to_rgba();
        for _ in 1..n {
            texels.extend_from_slice(&fill);
        }
        for (&id, color) in self.colors.range(1..=max_region_id) {
            let o = id as usize * 4;
            texels[o..o + 4].copy_from_slice(&color.to_rgba());
        }
        texels
    }
}
