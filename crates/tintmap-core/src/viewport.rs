//! Pan/zoom transform between screen and image coordinates

use serde::{Deserialize, Serialize};

/// Screen-to-image transform.
///
/// A screen point `(sx, sy)` maps to image pixel
/// `floor((sx - offset_x) / zoom), floor((sy - offset_y) / zoom)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Horizontal pan in screen pixels
    pub offset_x: f64,
    /// Vertical pan in screen pixels
    pub offset_y: f64,
    /// Magnification; 1.0 shows one image pixel per screen pixel
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Viewport {
    /// No pan, no zoom
    pub const IDENTITY: Viewport = Viewport {
        offset_x: 0.0,
        offset_y: 0.0,
        zoom: 1.0,
    };

    /// Create a transform; non-positive or non-finite zoom falls back to 1.
    pub fn new(offset_x: f64, offset_y: f64, zoom: f64) -> Self {
        let zoom = if zoom.is_finite() && zoom > 0.0 { zoom } else { 1.0 };
        Self {
            offset_x,
            offset_y,
            zoom,
        }
    }

    /// Map a screen point to an image pixel inside a `width`×`height` canvas.
    pub fn to_image(&self, sx: f64, sy: f64, width: u32, height: u32) -> Option<(u32, u32)> {
        let ix = ((sx - self.offset_x) / self.zoom).floor();
        let iy = ((sy - self.offset_y) / self.zoom).floor();
        if !ix.is_finite() || !iy.is_finite() || ix < 0.0 || iy < 0.0 {
            return None;
        }
        if ix >= width as f64 || iy >= height as f64 {
            return None;
        }
        Some((ix as u32, iy as u32))
    }

    /// Map an image pixel's top-left corner to screen coordinates.
    pub fn to_screen(&self, x: u32, y: u32) -> (f64, f64) {
        (
            x as f64 * self.zoom + self.offset_x,
            y as f64 * self.zoom + self.offset_y,
        )
    }
}
