//! RGB colors, hex strings, and the color metrics used across the pipeline
//!
//! Three distances are used by different stages:
//!
//! - squared Euclidean ([`Rgb::distance_sq`]) for K-means assignment
//! - Euclidean ([`Rgb::distance`]) for outline and color-edge thresholds
//! - L1 ([`Rgb::l1_distance`]) for hint palette matching and safe-mode fills

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An opaque 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Opaque black
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    /// Opaque white
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    /// Create a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb`, `rrggbb` or the short form `#rgb`.
    pub fn from_hex(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        let parse = |part: &str| {
            u8::from_str_radix(part, 16).map_err(|_| Error::InvalidColor(s.to_string()))
        };
        match hex.len() {
            6 if hex.is_ascii() => Ok(Self::new(
                parse(&hex[0..2])?,
                parse(&hex[2..4])?,
                parse(&hex[4..6])?,
            )),
            3 if hex.is_ascii() => {
                let r = parse(&hex[0..1])?;
                let g = parse(&hex[1..2])?;
                let b = parse(&hex[2..3])?;
                Ok(Self::new(r * 17, g * 17, b * 17))
            }
            _ => Err(Error::InvalidColor(s.to_string())),
        }
    }

    /// Lowercase `#rrggbb`
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Largest channel value
    #[inline]
    pub fn max_channel(self) -> u8 {
        self.r.max(self.g).max(self.b)
    }

    /// Smallest channel value
    #[inline]
    pub fn min_channel(self) -> u8 {
        self.r.min(self.g).min(self.b)
    }

    /// Squared Euclidean distance in RGB space
    #[inline]
    pub fn distance_sq(self, other: Rgb) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }

    /// Euclidean distance in RGB space
    #[inline]
    pub fn distance(self, other: Rgb) -> f64 {
        (self.distance_sq(other) as f64).sqrt()
    }

    /// Manhattan (L1) distance in RGB space
    #[inline]
    pub fn l1_distance(self, other: Rgb) -> u32 {
        self.r.abs_diff(other.r) as u32
            + self.g.abs_diff(other.g) as u32
            + self.b.abs_diff(other.b) as u32
    }

    /// Hue in degrees, `[0, 360)`. Achromatic colors report `0`.
    pub fn hue_degrees(self) -> f64 {
        let r = self.r as f64 / 255.0;
        let g = self.g as f64 / 255.0;
        let b = self.b as f64 / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;
        if delta == 0.0 {
            return 0.0;
        }
        let h = if max == r {
            ((g - b) / delta).rem_euclid(6.0)
        } else if max == g {
            (b - r) / delta + 2.0
        } else {
            (r - g) / delta + 4.0
        };
        (h * 60.0).rem_euclid(360.0)
    }

    /// HSL lightness, `[0, 1]`
    pub fn lightness(self) -> f64 {
        (self.max_channel() as f64 + self.min_channel() as f64) / (2.0 * 255.0)
    }

    /// RGBA bytes with full opacity
    #[inline]
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Rgb::from_hex(s)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgb::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip() {
        let c = Rgb::from_hex("#FF8000").unwrap();
        assert_eq!(c, Rgb::new(255, 128, 0));
        assert_eq!(c.to_hex(), "#ff8000");
        assert_eq!(Rgb::from_hex("0a0b0c").unwrap(), Rgb::new(10, 11, 12));
        assert_eq!(Rgb::from_hex("#fff").unwrap(), Rgb::WHITE);
    }

    #[test]
    fn test_hex_rejects_garbage() {
        assert!(Rgb::from_hex("#12345").is_err());
        assert!(Rgb::from_hex("#gg0000").is_err());
        assert!(Rgb::from_hex("").is_err());
    }

    #[test]
    fn test_hue() {
        assert_eq!(Rgb::new(255, 0, 0).hue_degrees(), 0.0);
        assert!((Rgb::new(0, 255, 0).hue_degrees() - 120.0).abs() < 1e-9);
        assert!((Rgb::new(0, 0, 255).hue_degrees() - 240.0).abs() < 1e-9);
        assert!((Rgb::new(255, 0, 255).hue_degrees() - 300.0).abs() < 1e-9);
        assert_eq!(Rgb::new(90, 90, 90).hue_degrees(), 0.0);
    }

    #[test]
    fn test_lightness() {
        assert_eq!(Rgb::BLACK.lightness(), 0.0);
        assert_eq!(Rgb::WHITE.lightness(), 1.0);
        assert!((Rgb::new(255, 0, 0).lightness() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_distances() {
        let a = Rgb::new(0, 0, 0);
        let b = Rgb::new(3, 4, 0);
        assert_eq!(a.distance_sq(b), 25);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(a.l1_distance(b), 7);
    }
}
