//! Median filtering on a grayscale proxy of the raster

use crate::MorphResult;
use tintmap_core::RasterImage;

/// 3×3 median of the green channel
///
/// Green stands in for luminance. Edge pixels replicate their nearest
/// in-canvas neighbor, so every output sample is a median of nine values.
/// Returns one byte per pixel, row-major.
pub fn median3x3_green(raster: &RasterImage) -> MorphResult<Vec<u8>> {
    let (w, h) = (raster.width() as i64, raster.height() as i64);
    let data = raster.data();
    let green = |x: i64, y: i64| -> u8 {
        let cx = x.clamp(0, w - 1);
        let cy = y.clamp(0, h - 1);
        data[((cy * w + cx) * 4 + 1) as usize]
    };

    let mut out = Vec::with_capacity(raster.pixel_count());
    let mut window = [0u8; 9];
    for y in 0..h {
        for x in 0..w {
            let mut k = 0;
            for dy in -1..=1 {
                for dx in -1..=1 {
                    window[k] = green(x + dx, y + dy);
                    k += 1;
                }
            }
            window.sort_unstable();
            out.push(window[4]);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tintmap_core::Rgb;

    #[test]
    fn test_removes_salt_noise() {
        let raster = RasterImage::filled(5, 5, Rgb::WHITE)
            .unwrap()
            .with_pixel(2, 2, Rgb::BLACK);
        let out = median3x3_green(&raster).unwrap();
        assert!(out.iter().all(|&v| v == 255));
    }

    #[test]
    fn test_uses_green_channel() {
        let raster = RasterImage::filled(3, 3, Rgb::new(255, 10, 255)).unwrap();
        let out = median3x3_green(&raster).unwrap();
        assert_eq!(out, vec![10; 9]);
    }

    #[test]
    fn test_preserves_thick_line() {
        let mut raster = RasterImage::filled(6, 6, Rgb::WHITE).unwrap();
        for y in 0..6 {
            raster = raster.with_pixel(2, y, Rgb::BLACK).with_pixel(3, y, Rgb::BLACK);
        }
        let out = median3x3_green(&raster).unwrap();
        assert_eq!(out[2 * 6 + 2], 0);
        assert_eq!(out[2 * 6], 255);
    }
}
