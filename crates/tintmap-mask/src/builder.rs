//! Wall mask construction
//!
//! Two front ends produce the same mask contract:
//!
//! - **Direct**: threshold on the darkest channel, despeckle, close small
//!   gaps, stamp a border.
//! - **Skeleton**: median-filter the green channel, threshold, despeckle,
//!   thin to a 1-pixel skeleton, thicken it back with a disk of the chosen
//!   [`Thickness`], close once more, stamp a border.
//!
//! The mask that comes out feeds both the outline overlay and the region
//! labeler, so what the user sees and what is clickable line up pixel for
//! pixel. Building is a pure function of raster and settings.

use crate::error::{MaskError, MaskResult};
use log::debug;
use std::time::Instant;
use tintmap_core::config::{MaskMode, Thickness, WallMaskSettings};
use tintmap_core::{RasterImage, WallMask};
use tintmap_morph::{close_disk, dilate_disk, median3x3_green, stamp_border, zhang_suen};
use tintmap_region::remove_small_wall_components;

/// Build a wall mask from a raster
///
/// `thickness` is only consulted by [`MaskMode::Skeleton`].
pub fn build_wall_mask(
    raster: &RasterImage,
    settings: &WallMaskSettings,
    thickness: Thickness,
) -> MaskResult<WallMask> {
    check_settings(settings)?;
    let start = Instant::now();

    let mask = match settings.mode {
        MaskMode::Direct => build_direct(raster, settings)?,
        MaskMode::Skeleton => build_skeleton(raster, settings, thickness)?,
    };

    debug!(
        "build_wall_mask({:?}): {}x{}, {} wall pixels in {:?}",
        settings.mode,
        mask.width(),
        mask.height(),
        mask.count_walls(),
        start.elapsed()
    );
    Ok(mask)
}

fn check_settings(settings: &WallMaskSettings) -> MaskResult<()> {
    if settings.gap_closing_radius > tintmap_morph::sel::MAX_DISK_RADIUS {
        return Err(MaskError::InvalidParameters(format!(
            "gap_closing_radius {} is larger than {}",
            settings.gap_closing_radius,
            tintmap_morph::sel::MAX_DISK_RADIUS
        )));
    }
    Ok(())
}

/// Wall where the brightest channel is still below `threshold`
pub fn threshold_max_channel(raster: &RasterImage, threshold: u8) -> MaskResult<WallMask> {
    let data: Vec<u8> = raster
        .pixels()
        .map(|c| u8::from(c.max_channel() < threshold))
        .collect();
    Ok(WallMask::from_vec(raster.width(), raster.height(), data)?)
}

fn build_direct(raster: &RasterImage, settings: &WallMaskSettings) -> MaskResult<WallMask> {
    let mask = threshold_max_channel(raster, settings.median_threshold)?;
    let despeckled = remove_small_wall_components(&mask, settings.despeckle_min_size)?;
    let mut mask = close_disk(&despeckled.mask, settings.gap_closing_radius)?;
    stamp_border(&mut mask, settings.edge_border_width);
    Ok(mask)
}

fn build_skeleton(
    raster: &RasterImage,
    settings: &WallMaskSettings,
    thickness: Thickness,
) -> MaskResult<WallMask> {
    let gray = median3x3_green(raster)?;
    let data: Vec<u8> = gray
        .iter()
        .map(|&g| u8::from(g < settings.median_threshold))
        .collect();
    let mask = WallMask::from_vec(raster.width(), raster.height(), data)?;
    let despeckled = remove_small_wall_components(&mask, settings.despeckle_min_size)?;
    let skeleton = zhang_suen(&despeckled.mask)?;
    let thick = dilate_disk(&skeleton, thickness.radius())?;
    let mut mask = close_disk(&thick, 1)?;
    stamp_border(&mut mask, settings.edge_border_width);
    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tintmap_core::Rgb;

    fn line_art() -> RasterImage {
        let mut raster = RasterImage::filled(16, 12, Rgb::WHITE).unwrap();
        for x in 2..14 {
            raster = raster.with_pixel(x, 6, Rgb::new(20, 20, 20));
        }
        raster.with_pixel(4, 2, Rgb::BLACK)
    }

    #[test]
    fn test_direct_threshold_and_despeckle() {
        let settings = WallMaskSettings {
            gap_closing_radius: 0,
            edge_border_width: 0,
            ..Default::default()
        };
        let mask = build_wall_mask(&line_art(), &settings, Thickness::Medium).unwrap();
        assert!(mask.is_wall(5, 6));
        // isolated dot is below despeckle_min_size
        assert!(!mask.is_wall(4, 2));
        assert_eq!(mask.count_walls(), 12);
    }

    #[test]
    fn test_border_is_stamped() {
        let settings = WallMaskSettings::default();
        let mask = build_wall_mask(&line_art(), &settings, Thickness::Medium).unwrap();
        for x in 0..16 {
            assert!(mask.is_wall(x, 0) && mask.is_wall(x, 1) && mask.is_wall(x, 11));
        }
        assert!(!mask.is_wall(8, 3));
    }

    #[test]
    fn test_skeleton_path_thickens() {
        let settings = WallMaskSettings {
            mode: MaskMode::Skeleton,
            despeckle_min_size: 0,
            edge_border_width: 0,
            ..Default::default()
        };
        let mut raster = RasterImage::filled(20, 20, Rgb::WHITE).unwrap();
        for y in 2..18 {
            for x in 8..12 {
                raster = raster.with_pixel(x, y, Rgb::BLACK);
            }
        }
        let thin = build_wall_mask(&raster, &settings, Thickness::Thin).unwrap();
        let heavy = build_wall_mask(&raster, &settings, Thickness::Heavy).unwrap();
        assert!(thin.count_walls() > 0);
        assert!(heavy.count_walls() > thin.count_walls());
    }

    #[test]
    fn test_rejects_huge_radius() {
        let settings = WallMaskSettings {
            gap_closing_radius: 1000,
            ..Default::default()
        };
        assert!(build_wall_mask(&line_art(), &settings, Thickness::Thin).is_err());
    }
}
