//! Image file input and output
//!
//! The engine works on in-memory RGBA rasters; these helpers convert at the
//! file boundary through the `image` crate.

use crate::error::TintmapResult;
use std::path::Path;
use tintmap_core::{RasterImage, WallMask};

/// Decode any supported image file into an RGBA raster
pub fn read_raster(path: impl AsRef<Path>) -> TintmapResult<RasterImage> {
    let img = image::open(path.as_ref())?.to_rgba8();
    let (width, height) = img.dimensions();
    Ok(RasterImage::from_rgba(width, height, img.into_raw())?)
}

/// Write a raster as PNG
pub fn write_raster_png(raster: &RasterImage, path: impl AsRef<Path>) -> TintmapResult<()> {
    image::save_buffer(
        path.as_ref(),
        raster.data(),
        raster.width(),
        raster.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(())
}

/// Write a wall mask as a black-on-white PNG
pub fn write_mask_png(mask: &WallMask, path: impl AsRef<Path>) -> TintmapResult<()> {
    let pixels: Vec<u8> = mask
        .data()
        .iter()
        .map(|&v| if v != 0 { 0 } else { 255 })
        .collect();
    image::save_buffer(
        path.as_ref(),
        &pixels,
        mask.width(),
        mask.height(),
        image::ExtendedColorType::L8,
    )?;
    Ok(())
}
