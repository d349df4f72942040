//! RasterImage - the immutable RGBA input to the pipeline
//!
//! Pixels are stored row-major as `[r, g, b, a]` byte quadruples. A raster
//! is validated once at construction; every stage downstream may assume
//! `width > 0`, `height > 0` and `data.len() == width * height * 4`.

use crate::color::Rgb;
use crate::error::{Error, Result};

/// Bytes per RGBA pixel
pub const BYTES_PER_PIXEL: usize = 4;

/// Immutable width×height RGBA8 image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RasterImage {
    /// Wrap an RGBA buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] for a zero-sized image and
    /// [`Error::BufferSizeMismatch`] when `data` does not hold exactly
    /// `width * height` RGBA pixels.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        check_dimensions(width, height)?;
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(Error::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Create an opaque image filled with a single color.
    pub fn filled(width: u32, height: u32, color: Rgb) -> Result<Self> {
        check_dimensions(width, height)?;
        let n = width as usize * height as usize;
        let mut data = Vec::with_capacity(n * BYTES_PER_PIXEL);
        for _ in 0..n {
            data.extend_from_slice(&[color.r, color.g, color.b, 255]);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Image width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Raw RGBA bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the image and return its buffer.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// RGB at a flat pixel index. Alpha is ignored.
    #[inline]
    pub fn rgb_at_index(&self, index: usize) -> Rgb {
        let o = index * BYTES_PER_PIXEL;
        Rgb::new(self.data[o], self.data[o + 1], self.data[o + 2])
    }

    /// RGB at `(x, y)`, or `None` outside the canvas.
    pub fn rgb(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.rgb_at_index(y as usize * self.width as usize + x as usize))
    }

    /// Iterate over all pixels as RGB in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = Rgb> + '_ {
        self.data
            .chunks_exact(BYTES_PER_PIXEL)
            .map(|p| Rgb::new(p[0], p[1], p[2]))
    }

    /// Return a copy with one pixel replaced.
    ///
    /// Intended for building fixtures; the pipeline never mutates rasters.
    pub fn with_pixel(mut self, x: u32, y: u32, color: Rgb) -> Self {
        if x < self.width && y < self.height {
            let o = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
            self.data[o] = color.r;
            self.data[o + 1] = color.g;
            self.data[o + 2] = color.b;
            self.data[o + 3] = 255;
        }
        self
    }
}

/// Reject zero-sized canvases before they enter any stage.
pub fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimension { width, height });
    }
    Ok(())
}
