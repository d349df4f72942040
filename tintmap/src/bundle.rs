//! Persistence bundle
//!
//! A bundle is everything needed to reopen a coloring job: the label map,
//! the opaque vector outlines, asset references, the palette and, when the
//! user has started coloring, their progress. It serializes as camelCase
//! JSON:
//!
//! ```json
//! {
//!   "manifest": { "id": "...", "name": "...", "createdAt": 0, "width": 4, "height": 4 },
//!   "layers": { "regions": { "width": 4, "height": 4, "labelMap": [...], "maxRegionId": 4 },
//!               "outlines": null },
//!   "assets": { "originalUrl": null, "coloredPreviewUrl": null },
//!   "palette": [{ "name": "#ff0000", "hex": "#ff0000" }]
//! }
//! ```

use crate::error::{TintmapError, TintmapResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tintmap_color::PaletteEntry;
use tintmap_core::{LabelMap, Rgb, WALL_REGION, WallMask};
use tintmap_fill::ProgressSnapshot;

/// Identity and size of a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub id: String,
    pub name: String,
    /// Milliseconds since the Unix epoch
    pub created_at: u64,
    pub width: u32,
    pub height: u32,
}

/// Region layer: the label map in row-major order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionsLayer {
    pub width: u32,
    pub height: u32,
    pub label_map: Vec<u32>,
    pub max_region_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layers {
    pub regions: RegionsLayer,
    /// Vector outline overlay, passed through untouched
    #[serde(default)]
    pub outlines: Option<String>,
}

/// References to externally stored images
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assets {
    #[serde(default)]
    pub original_url: Option<String>,
    #[serde(default)]
    pub colored_preview_url: Option<String>,
}

/// A saved coloring job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub manifest: Manifest,
    pub layers: Layers,
    #[serde(default)]
    pub assets: Assets,
    pub palette: Vec<PaletteEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<ProgressSnapshot>,
}

impl Bundle {
    /// Assemble a bundle from a label map and palette
    pub fn new(id: &str, name: &str, labels: &LabelMap, palette: &[Rgb]) -> Self {
        let (width, height) = labels.dimensions();
        Self {
            manifest: Manifest {
                id: id.to_string(),
                name: name.to_string(),
                created_at: now_millis(),
                width,
                height,
            },
            layers: Layers {
                regions: RegionsLayer {
                    width,
                    height,
                    label_map: labels.labels().to_vec(),
                    max_region_id: labels.max_region_id(),
                },
                outlines: None,
            },
            assets: Assets::default(),
            palette: tintmap_color::palette_entries(palette),
            progress: None,
        }
    }

    /// Check that the layers agree with the manifest and each other
    ///
    /// The label map must cover the manifest size and use every id in
    /// `1..=maxRegionId`; saved progress may only name those ids.
    pub fn validate(&self) -> TintmapResult<()> {
        let regions = &self.layers.regions;
        if (regions.width, regions.height) != (self.manifest.width, self.manifest.height) {
            return Err(TintmapError::InvalidBundle(format!(
                "region layer is {}x{} but the manifest says {}x{}",
                regions.width, regions.height, self.manifest.width, self.manifest.height
            )));
        }
        let pixels = regions.width as u64 * regions.height as u64;
        if regions.label_map.len() as u64 != pixels {
            return Err(TintmapError::InvalidBundle(format!(
                "label map has {} entries for {} pixels",
                regions.label_map.len(),
                pixels
            )));
        }
        let max = regions.label_map.iter().copied().max().unwrap_or(WALL_REGION);
        if max != regions.max_region_id {
            return Err(TintmapError::InvalidBundle(format!(
                "maxRegionId is {} but the label map reaches {}",
                regions.max_region_id, max
            )));
        }
        if max as u64 > pixels {
            return Err(TintmapError::InvalidBundle(format!(
                "maxRegionId {} exceeds the {} pixels of the canvas",
                max, pixels
            )));
        }
        let mut seen = vec![false; max as usize + 1];
        for &id in &regions.label_map {
            seen[id as usize] = true;
        }
        if let Some(missing) = (1..=max).find(|&id| !seen[id as usize]) {
            return Err(TintmapError::InvalidBundle(format!(
                "region {} is missing from the label map",
                missing
            )));
        }
        if let Some(progress) = &self.progress {
            let unknown = progress
                .colors
                .iter()
                .map(|(id, _)| id)
                .chain(progress.timelapse.frames().iter().map(|f| f.region_id))
                .find(|&id| id == WALL_REGION || id > max);
            if let Some(id) = unknown {
                return Err(TintmapError::InvalidBundle(format!(
                    "progress names region {} outside 1..={}",
                    id, max
                )));
            }
        }
        self.palette_colors()?;
        Ok(())
    }

    /// Rebuild the label map
    pub fn label_map(&self) -> TintmapResult<LabelMap> {
        let regions = &self.layers.regions;
        Ok(LabelMap::from_vec(
            regions.width,
            regions.height,
            regions.label_map.clone(),
        )?)
    }

    /// Walls are exactly the region-0 pixels
    pub fn wall_mask(&self) -> TintmapResult<WallMask> {
        let regions = &self.layers.regions;
        let data = regions
            .label_map
            .iter()
            .map(|&l| u8::from(l == WALL_REGION))
            .collect();
        Ok(WallMask::from_vec(regions.width, regions.height, data)?)
    }

    /// Palette as colors
    pub fn palette_colors(&self) -> TintmapResult<Vec<Rgb>> {
        Ok(self
            .palette
            .iter()
            .map(PaletteEntry::rgb)
            .collect::<Result<Vec<_>, _>>()?)
    }

    pub fn to_json_string(&self) -> TintmapResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse and validate
    pub fn from_json_str(json: &str) -> TintmapResult<Self> {
        let bundle: Bundle = serde_json::from_str(json)?;
        bundle.validate()?;
        Ok(bundle)
    }

    pub fn write(&self, path: impl AsRef<Path>) -> TintmapResult<()> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    pub fn read(path: impl AsRef<Path>) -> TintmapResult<Self> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
