//! Palette extraction
//!
//! Reduces an illustration to a small ordered palette:
//!
//! 1. **Sample**: every `sample_step`-th pixel, dropping near-black outline
//!    and near-white background samples
//! 2. **Cluster**: K-means with centroids seeded from the samples
//! 3. **Order**: round to hex, deduplicate, sort by hue with near-equal hues
//!    ordered light to dark
//!
//! Seeding goes through [`SeedSource`] so tests can pin it down.

use crate::{ColorError, ColorResult};
use log::debug;
use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tintmap_core::config::PaletteSettings;
use tintmap_core::{RasterImage, Rgb};

// =============================================================================
// Constants
// =============================================================================

/// Returned when sampling leaves nothing to cluster
pub const FALLBACK_COLOR: Rgb = Rgb::new(0x80, 0x80, 0x80);

/// Hues closer than this are ordered by lightness instead
pub const HUE_TIE_DEGREES: f64 = 5.0;

/// Iteration stops once every centroid channel moves less than this
const CONVERGENCE_DELTA: f64 = 1.0;

// =============================================================================
// Types
// =============================================================================

/// Source of seed indices for K-means
pub trait SeedSource {
    /// Uniform index in `0..len`; `len` is never zero
    fn next_index(&mut self, len: usize) -> usize;
}

impl SeedSource for StdRng {
    fn next_index(&mut self, len: usize) -> usize {
        self.random_range(0..len)
    }
}

/// One palette swatch
///
/// `name` is the hex string as well; the palette carries no color names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub name: String,
    pub hex: String,
}

impl PaletteEntry {
    /// Entry for a color
    pub fn from_rgb(color: Rgb) -> Self {
        let hex = color.to_hex();
        Self {
            name: hex.clone(),
            hex,
        }
    }

    /// Parse the entry's color
    pub fn rgb(&self) -> ColorResult<Rgb> {
        Ok(Rgb::from_hex(&self.hex)?)
    }
}

/// Raw K-means output
#[derive(Debug, Clone)]
pub struct KMeansResult {
    /// Final centroids, unrounded
    pub centroids: Vec<[f64; 3]>,
    /// Rounds run
    pub iterations: u32,
    /// Whether the centroids settled before the round limit
    pub converged: bool,
}

// =============================================================================
// Sampling
// =============================================================================

/// Collect the samples K-means clusters
///
/// Visits flat pixel indices `0, step, 2·step, …`. A sample is dropped when
/// all three channels are below `black_threshold` or all three are above
/// `white_threshold`.
pub fn sample_colors(raster: &RasterImage, settings: &PaletteSettings) -> ColorResult<Vec<Rgb>> {
    if settings.sample_step == 0 {
        return Err(ColorError::InvalidParameters(
            "sample_step must be at least 1".into(),
        ));
    }
    let step = settings.sample_step as usize;
    let samples = (0..raster.pixel_count())
        .step_by(step)
        .map(|i| raster.rgb_at_index(i))
        .filter(|c| {
            let dark = c.max_channel() < settings.black_threshold;
            let light = c.min_channel() > settings.white_threshold;
            !dark && !light
        })
        .collect();
    Ok(samples)
}

// =============================================================================
// K-means
// =============================================================================

/// Cluster `samples` into `k` groups
///
/// Centroids start at `k` samples drawn uniformly with replacement. An
/// empty cluster keeps its previous centroid. Stops when every channel of
/// every centroid moved less than 1, or after `max_iterations` rounds.
pub fn kmeans(
    samples: &[Rgb],
    k: usize,
    max_iterations: u32,
    seeds: &mut dyn SeedSource,
) -> ColorResult<KMeansResult> {
    if samples.is_empty() {
        return Err(ColorError::InvalidParameters("no samples to cluster".into()));
    }
    if k == 0 {
        return Err(ColorError::InvalidParameters("k must be at least 1".into()));
    }

    let mut centroids: Vec<[f64; 3]> = (0..k)
        .map(|_| {
            let c = samples[seeds.next_index(samples.len()) % samples.len()];
            [c.r as f64, c.g as f64, c.b as f64]
        })
        .collect();

    let mut sums = vec![[0.0f64; 3]; k];
    let mut counts = vec![0usize; k];
    let mut iterations = 0;
    let mut converged = false;

    while iterations < max_iterations {
        iterations += 1;
        sums.iter_mut().for_each(|s| *s = [0.0; 3]);
        counts.iter_mut().for_each(|n| *n = 0);

        for c in samples {
            let p = [c.r as f64, c.g as f64, c.b as f64];
            let nearest = nearest_centroid(&centroids, p);
            for ch in 0..3 {
                sums[nearest][ch] += p[ch];
            }
            counts[nearest] += 1;
        }

        let mut max_delta = 0.0f64;
        for (i, centroid) in centroids.iter_mut().enumerate() {
            if counts[i] == 0 {
                continue;
            }
            for ch in 0..3 {
                let mean = sums[i][ch] / counts[i] as f64;
                max_delta = max_delta.max((mean - centroid[ch]).abs());
                centroid[ch] = mean;
            }
        }

        if max_delta < CONVERGENCE_DELTA {
            converged = true;
            break;
        }
    }

    Ok(KMeansResult {
        centroids,
        iterations,
        converged,
    })
}

fn nearest_centroid(centroids: &[[f64; 3]], p: [f64; 3]) -> usize {
    let mut best = 0;
    let mut best_d = f64::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = (c[0] - p[0]).powi(2) + (c[1] - p[1]).powi(2) + (c[2] - p[2]).powi(2);
        if d < best_d {
            best_d = d;
            best = i;
        }
    }
    best
}

// =============================================================================
// Ordering
// =============================================================================

/// Sort colors by hue, ordering runs of near-equal hues light to dark
///
/// Colors are first sorted by hue. Starting from the first color, every
/// following color whose hue is within [`HUE_TIE_DEGREES`] of it forms a
/// run, which is re-sorted by lightness descending; the next run starts at
/// the first color outside it.
pub fn sort_by_hue(colors: &mut [Rgb]) {
    colors.sort_by(|a, b| {
        a.hue_degrees()
            .total_cmp(&b.hue_degrees())
            .then_with(|| a.to_hex().cmp(&b.to_hex()))
    });

    let mut start = 0;
    while start < colors.len() {
        let anchor = colors[start].hue_degrees();
        let mut end = start + 1;
        while end < colors.len() && colors[end].hue_degrees() - anchor < HUE_TIE_DEGREES {
            end += 1;
        }
        colors[start..end].sort_by(|a, b| {
            b.lightness()
                .total_cmp(&a.lightness())
                .then_with(|| a.hue_degrees().total_cmp(&b.hue_degrees()))
                .then_with(|| a.to_hex().cmp(&b.to_hex()))
        });
        start = end;
    }
}

/// Round centroids, deduplicate, and order them
pub fn finalize_palette(centroids: &[[f64; 3]]) -> Vec<Rgb> {
    let mut colors: Vec<Rgb> = centroids
        .iter()
        .map(|c| {
            let ch = |v: f64| v.round().clamp(0.0, 255.0) as u8;
            Rgb::new(ch(c[0]), ch(c[1]), ch(c[2]))
        })
        .collect();
    colors.sort_by_key(|c| (c.r, c.g, c.b));
    colors.dedup();
    sort_by_hue(&mut colors);
    colors
}

// =============================================================================
// Public API
// =============================================================================

/// Extract an ordered palette from a raster
///
/// With no usable samples the palette is the single [`FALLBACK_COLOR`].
pub fn extract_palette(
    raster: &RasterImage,
    settings: &PaletteSettings,
    seeds: &mut dyn SeedSource,
) -> ColorResult<Vec<Rgb>> {
    let samples = sample_colors(raster, settings)?;
    if samples.is_empty() {
        debug!("extract_palette: no samples, using fallback");
        return Ok(vec![FALLBACK_COLOR]);
    }

    let result = kmeans(
        &samples,
        settings.k as usize,
        settings.max_iterations,
        seeds,
    )?;
    let palette = finalize_palette(&result.centroids);
    debug!(
        "extract_palette: {} samples, k={}, {} iterations (converged: {}), {} colors",
        samples.len(),
        settings.k,
        result.iterations,
        result.converged,
        palette.len()
    );
    Ok(palette)
}

/// Palette as serializable entries
pub fn palette_entries(colors: &[Rgb]) -> Vec<PaletteEntry> {
    colors.iter().copied().map(PaletteEntry::from_rgb).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    /// Replays a fixed index list
    struct Scripted(Vec<usize>);

    impl SeedSource for Scripted {
        fn next_index(&mut self, len: usize) -> usize {
            let i = self.0.remove(0);
            i % len
        }
    }

    #[test]
    fn test_sampling_drops_outline_and_background() {
        let raster = RasterImage::from_rgba(
            4,
            1,
            vec![
                0, 0, 0, 255, // black
                255, 255, 255, 255, // white
                200, 30, 30, 255, // red
                250, 250, 100, 255, // yellow: blue channel keeps it
            ],
        )
        .unwrap();
        let settings = PaletteSettings {
            sample_step: 1,
            ..Default::default()
        };
        let samples = sample_colors(&raster, &settings).unwrap();
        assert_eq!(samples, vec![Rgb::new(200, 30, 30), Rgb::new(250, 250, 100)]);
        let settings = PaletteSettings {
            sample_step: 2,
            ..Default::default()
        };
        assert_eq!(sample_colors(&raster, &settings).unwrap(), vec![Rgb::new(200, 30, 30)]);
    }

    #[test]
    fn test_empty_samples_fall_back() {
        let raster = RasterImage::filled(8, 8, Rgb::WHITE).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let palette = extract_palette(&raster, &PaletteSettings::default(), &mut rng).unwrap();
        assert_eq!(palette, vec![FALLBACK_COLOR]);
    }

    #[test]
    fn test_kmeans_separates_two_clusters() {
        let samples = vec![
            Rgb::new(200, 0, 0),
            Rgb::new(210, 0, 0),
            Rgb::new(0, 0, 200),
            Rgb::new(0, 0, 210),
        ];
        let mut seeds = Scripted(vec![0, 2]);
        let result = kmeans(&samples, 2, 20, &mut seeds).unwrap();
        assert!(result.converged);
        assert!(result.iterations <= 20);
        assert_eq!(result.centroids[0], [205.0, 0.0, 0.0]);
        assert_eq!(result.centroids[1], [0.0, 0.0, 205.0]);
    }

    #[test]
    fn test_empty_cluster_keeps_stale_centroid() {
        let samples = vec![Rgb::new(10, 10, 10), Rgb::new(12, 12, 12)];
        // both seeds on the same sample: ties go to the first cluster
        let mut seeds = Scripted(vec![0, 0]);
        let result = kmeans(&samples, 2, 1, &mut seeds).unwrap();
        assert!(!result.converged);
        assert_eq!(result.centroids[0], [11.0, 11.0, 11.0]);
        assert_eq!(result.centroids[1], [10.0, 10.0, 10.0]);
    }

    #[test]
    fn test_kmeans_respects_iteration_limit() {
        let samples: Vec<Rgb> = (0..50u8).map(|i| Rgb::new(i * 5, 255 - i * 5, i)).collect();
        let mut rng = StdRng::seed_from_u64(1);
        let result = kmeans(&samples, 6, 1, &mut rng).unwrap();
        assert_eq!(result.iterations, 1);
    }

    #[test]
    fn test_sort_by_hue_ties_by_lightness() {
        let dark_red = Rgb::new(120, 0, 0); // hue 0
        let light_red = Rgb::new(255, 120, 110); // hue ~4
        let green = Rgb::new(0, 200, 0); // hue 120
        let blue = Rgb::new(0, 0, 200); // hue 240
        let mut colors = vec![blue, dark_red, green, light_red];
        sort_by_hue(&mut colors);
        assert_eq!(colors, vec![light_red, dark_red, green, blue]);
    }

    #[test]
    fn test_finalize_dedupes() {
        let centroids = vec![[10.2, 20.0, 200.4], [9.8, 20.0, 199.6], [200.0, 10.0, 10.0]];
        let palette = finalize_palette(&centroids);
        assert_eq!(palette, vec![Rgb::new(200, 10, 10), Rgb::new(10, 20, 200)]);
        let entries = palette_entries(&palette);
        assert_eq!(entries[0].name, "#c80a0a");
        assert_eq!(entries[0].hex, entries[0].name);
        assert_eq!(entries[1].rgb().unwrap(), Rgb::new(10, 20, 200));
    }
}
