//! CPU composite for export
//!
//! Produces the same image the compositor shader draws: walls black,
//! colored regions in their color, everything else white. Used for the
//! completion event and autosave previews, never for interactive display.

use crate::error::FillResult;
use tintmap_core::{LabelMap, RasterImage, RegionColorMap, WallMask};

/// Render labels, walls and colors into an RGBA raster
pub fn render_composite(
    labels: &LabelMap,
    mask: &WallMask,
    colors: &RegionColorMap,
) -> FillResult<RasterImage> {
    mask.check_same_size(labels.width(), labels.height())?;
    let texels = colors.palette_texels(labels.max_region_id());
    let mut data = Vec::with_capacity(labels.labels().len() * 4);

    for (&l, &wall) in labels.labels().iter().zip(mask.data()) {
        // a wall in the mask wins even if the labels disagree
        let index = if wall != 0 { 0 } else { l as usize * 4 };
        data.extend_from_slice(&texels[index..index + 4]);
    }
    Ok(RasterImage::from_rgba(labels.width(), labels.height(), data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tintmap_core::Rgb;

    #[test]
    fn test_composite() {
        let mask = WallMask::from_ascii(&[".#."]).unwrap();
        let labels = LabelMap::from_vec(3, 1, vec![1, 0, 2]).unwrap();
        let mut colors = RegionColorMap::new();
        colors.set(2, Rgb::new(0, 128, 255));
        let out = render_composite(&labels, &mask, &colors).unwrap();
        assert_eq!(out.rgb(0, 0), Some(Rgb::WHITE));
        assert_eq!(out.rgb(1, 0), Some(Rgb::BLACK));
        assert_eq!(out.rgb(2, 0), Some(Rgb::new(0, 128, 255)));
    }
}
