//! Region hints
//!
//! For every large enough region, where to draw its hint, what color the
//! reference illustration has there, and which palette swatch is closest.

use crate::{ColorError, ColorResult};
use log::debug;
use serde::{Deserialize, Serialize};
use tintmap_core::config::HintSettings;
use tintmap_core::{LabelMap, RasterImage, Rgb, WALL_REGION};

/// Hint for one region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionHint {
    pub region_id: u32,
    /// Rounded mean pixel position
    pub centroid: (u32, u32),
    /// Channel means of the reference pixels in the region
    pub average: Rgb,
    /// Index of the nearest palette color by L1 distance
    pub palette_index: Option<usize>,
}

/// Compute hints for every region with at least
/// `min_region_size_for_hints` pixels, ordered by region id
pub fn analyze_hints(
    labels: &LabelMap,
    reference: &RasterImage,
    palette: &[Rgb],
    settings: &HintSettings,
) -> ColorResult<Vec<RegionHint>> {
    if labels.dimensions() != (reference.width(), reference.height()) {
        return Err(ColorError::Core(tintmap_core::Error::DimensionMismatch {
            expected: labels.dimensions(),
            actual: (reference.width(), reference.height()),
        }));
    }

    #[derive(Clone, Copy, Default)]
    struct Acc {
        sx: u64,
        sy: u64,
        sr: u64,
        sg: u64,
        sb: u64,
        n: u64,
    }

    let w = labels.width() as usize;
    let mut acc = vec![Acc::default(); labels.max_region_id() as usize + 1];
    for (i, &l) in labels.labels().iter().enumerate() {
        if l == WALL_REGION {
            continue;
        }
        let c = reference.rgb_at_index(i);
        let a = &mut acc[l as usize];
        a.sx += (i % w) as u64;
        a.sy += (i / w) as u64;
        a.sr += c.r as u64;
        a.sg += c.g as u64;
        a.sb += c.b as u64;
        a.n += 1;
    }

    let min = settings.min_region_size_for_hints as u64;
    let hints: Vec<RegionHint> = acc
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, a)| a.n > 0 && a.n >= min)
        .map(|(id, a)| {
            let n = a.n as f64;
            let mean = |s: u64| (s as f64 / n).round();
            let average = Rgb::new(mean(a.sr) as u8, mean(a.sg) as u8, mean(a.sb) as u8);
            RegionHint {
                region_id: id as u32,
                centroid: (mean(a.sx) as u32, mean(a.sy) as u32),
                average,
                palette_index: nearest_palette_index(palette, average),
            }
        })
        .collect();

    debug!(
        "analyze_hints: {} of {} regions hinted",
        hints.len(),
        labels.max_region_id()
    );
    Ok(hints)
}

/// Index of the palette color nearest to `color` by L1 distance; ties go to
/// the earlier entry
pub fn nearest_palette_index(palette: &[Rgb], color: Rgb) -> Option<usize> {
    palette
        .iter()
        .enumerate()
        .min_by_key(|(i, p)| (p.l1_distance(color), *i))
        .map(|(i, _)| i)
}
