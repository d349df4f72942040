//! tintmap-color - Palette extraction and region hints
//!
//! # Palette
//!
//! [`extract_palette`] samples the raster, clusters with K-means, and
//! returns a deduplicated palette ordered by hue. Seeding is injectable via
//! [`SeedSource`].
//!
//! # Hints
//!
//! [`analyze_hints`] computes, for each large enough region, its centroid,
//! its average reference color, and the nearest palette swatch.

mod error;
pub mod hints;
pub mod palette;

pub use error::{ColorError, ColorResult};

// Re-export palette extraction
pub use palette::{
    FALLBACK_COLOR, KMeansResult, PaletteEntry, SeedSource, extract_palette, finalize_palette,
    kmeans, palette_entries, sample_colors, sort_by_hue,
};

// Re-export hints
pub use hints::{RegionHint, analyze_hints, nearest_palette_index};
