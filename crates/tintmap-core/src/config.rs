//! Pipeline configuration and regen-level tagging
//!
//! Every numeric threshold used by mask building, leak repair and palette
//! extraction is externally overridable, either by loading a JSON document
//! or by a dotted key such as `repair.endpoint_bridge.angle_limit_degrees`.
//!
//! Each key carries a [`RegenLevel`]: the cheapest pipeline stage that must
//! rerun when that key changes. Callers compare old and new settings with
//! [`Settings::regen_level_for`] and rerun only what is required.
//!
//! ```
//! use tintmap_core::config::{RegenLevel, Settings};
//!
//! let old = Settings::default();
//! let mut new = old.clone();
//! new.set("palette.k", "8").unwrap();
//! assert_eq!(old.regen_level_for(&new), Some(RegenLevel::Palette));
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

// =============================================================================
// Regen level
// =============================================================================

/// Minimal recomputation required after a setting changes.
///
/// Variants are ordered by cost, so the maximum over a set of changed keys
/// is the stage to rerun.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegenLevel {
    /// Display-only; nothing is recomputed
    Live,
    /// Rerun palette extraction (and the hints that depend on it)
    Palette,
    /// Rerun mask building, labeling and palette extraction
    Reprocess,
    /// Regenerate the illustration upstream
    Api,
}

// =============================================================================
// Enumerated options
// =============================================================================

/// Illustration style requested from the external generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    #[default]
    Classic,
    StainedGlass,
    Mandala,
    Anime,
}

/// Detail level requested from the external generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Low,
    #[default]
    Medium,
    High,
}

/// Outline thickness used by the skeleton mask path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Thickness {
    Thin,
    #[default]
    Medium,
    Thick,
    Heavy,
}

impl Thickness {
    /// Circular dilation radius applied to the skeleton
    pub fn radius(self) -> u32 {
        match self {
            Thickness::Thin => 1,
            Thickness::Medium => 2,
            Thickness::Thick => 3,
            Thickness::Heavy => 5,
        }
    }
}

/// Which wall-mask path [`WallMaskSettings`] selects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskMode {
    /// Threshold, despeckle, close, border
    #[default]
    Direct,
    /// Median, threshold, despeckle, thin, thicken, close, border
    Skeleton,
}

/// Which front end produces the wall mask for a reprocess
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrontEnd {
    /// Synchronous wall-mask builder
    #[default]
    Builder,
    /// Off-thread leak-repair pipeline
    Repair,
}

// =============================================================================
// Settings groups
// =============================================================================

/// Options forwarded to the illustration generator
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    pub style: Style,
    pub complexity: Complexity,
    pub thickness: Thickness,
}

/// Wall-mask builder settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallMaskSettings {
    /// A pixel is a wall when its darkest-channel test falls below this
    pub median_threshold: u8,
    /// Wall components smaller than this (in pixels) are removed
    pub despeckle_min_size: u32,
    /// Radius of the closing that bridges micro-gaps; 0 disables it
    pub gap_closing_radius: u32,
    /// Width of the wall frame stamped around the canvas
    pub edge_border_width: u32,
    /// Direct or skeleton path
    pub mode: MaskMode,
}

impl Default for WallMaskSettings {
    fn default() -> Self {
        Self {
            median_threshold: 128,
            despeckle_min_size: 8,
            gap_closing_radius: 1,
            edge_border_width: 2,
            mode: MaskMode::Direct,
        }
    }
}

/// Endpoint bridging parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointBridgeParams {
    pub enabled: bool,
    pub max_endpoint_distance_px: f64,
    pub max_bridges_per_megapixel: f64,
    pub angle_limit_degrees: f64,
}

impl Default for EndpointBridgeParams {
    fn default() -> Self {
        Self {
            enabled: true,
            max_endpoint_distance_px: 12.0,
            max_bridges_per_megapixel: 400.0,
            angle_limit_degrees: 35.0,
        }
    }
}

/// Color-edge wall insertion parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorEdgeParams {
    pub enabled: bool,
    pub min_color_delta_l2: f64,
    pub dilate_px: u32,
}

impl Default for ColorEdgeParams {
    fn default() -> Self {
        Self {
            enabled: false,
            min_color_delta_l2: 60.0,
            dilate_px: 0,
        }
    }
}

/// Leak validation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeakValidationParams {
    pub enabled: bool,
    pub small_island_tolerance_px: u32,
    pub strengthen_once: bool,
}

impl Default for LeakValidationParams {
    fn default() -> Self {
        Self {
            enabled: true,
            small_island_tolerance_px: 12,
            strengthen_once: true,
        }
    }
}

/// Leak-repair pipeline parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairParams {
    /// Euclidean RGB distance to black below which a pixel is outline
    pub outline_black_rgb_distance: f64,
    pub thicken_px: u32,
    pub close_kernel_px: u32,
    pub open_kernel_px: u32,
    pub endpoint_bridge: EndpointBridgeParams,
    pub color_edge_walls: ColorEdgeParams,
    pub leak_validation: LeakValidationParams,
}

impl Default for RepairParams {
    fn default() -> Self {
        Self {
            outline_black_rgb_distance: 120.0,
            thicken_px: 1,
            close_kernel_px: 3,
            open_kernel_px: 0,
            endpoint_bridge: EndpointBridgeParams::default(),
            color_edge_walls: ColorEdgeParams::default(),
            leak_validation: LeakValidationParams::default(),
        }
    }
}

/// K-means palette extraction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteSettings {
    pub sample_step: u32,
    pub k: u32,
    pub max_iterations: u32,
    /// Samples with every channel below this are outline and dropped
    pub black_threshold: u8,
    /// Samples with every channel above this are background and dropped
    pub white_threshold: u8,
}

impl Default for PaletteSettings {
    fn default() -> Self {
        Self {
            sample_step: 4,
            k: 12,
            max_iterations: 20,
            black_threshold: 40,
            white_threshold: 235,
        }
    }
}

/// Hint analysis settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HintSettings {
    pub min_region_size_for_hints: u32,
}

impl Default for HintSettings {
    fn default() -> Self {
        Self {
            min_region_size_for_hints: 30,
        }
    }
}

/// Fill engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillSettings {
    /// History capacity in snapshots
    pub max_undo_steps: usize,
    /// Completion fires strictly above this colored fraction
    pub completion_ratio: f64,
    /// Completion requires strictly more qualifying regions than this
    pub completion_min_regions: u32,
    /// Reject fills whose L1 distance to the reference exceeds this
    pub safe_mode_tolerance: Option<u32>,
}

impl Default for FillSettings {
    fn default() -> Self {
        Self {
            max_undo_steps: 20,
            completion_ratio: 0.95,
            completion_min_regions: 10,
            safe_mode_tolerance: None,
        }
    }
}

/// Presentation-only settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub outline_opacity: f64,
    pub show_hints: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            outline_opacity: 1.0,
            show_hints: false,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub generation: GenerationOptions,
    pub front_end: FrontEnd,
    pub mask: WallMaskSettings,
    pub repair: RepairParams,
    pub palette: PaletteSettings,
    pub hints: HintSettings,
    pub fill: FillSettings,
    pub display: DisplaySettings,
}

// =============================================================================
// Setting values
// =============================================================================

/// A value that can be read and written through a dotted key.
trait SettingValue: Sized {
    fn to_setting_string(&self) -> String;
    fn parse_setting(raw: &str) -> Option<Self>;
}

macro_rules! numeric_setting_value {
    ($($t:ty),*) => {
        $(impl SettingValue for $t {
            fn to_setting_string(&self) -> String {
                self.to_string()
            }
            fn parse_setting(raw: &str) -> Option<Self> {
                raw.trim().parse().ok()
            }
        })*
    };
}

numeric_setting_value!(u8, u32, usize, bool);

impl SettingValue for f64 {
    fn to_setting_string(&self) -> String {
        self.to_string()
    }
    fn parse_setting(raw: &str) -> Option<Self> {
        raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

impl SettingValue for Option<u32> {
    fn to_setting_string(&self) -> String {
        self.map_or_else(|| "none".to_string(), |v| v.to_string())
    }
    fn parse_setting(raw: &str) -> Option<Self> {
        match raw.trim() {
            "" | "none" | "off" => Some(None),
            v => v.parse().ok().map(Some),
        }
    }
}

/// Enums round-trip through their serde snake_case names.
macro_rules! enum_setting_value {
    ($($t:ty),*) => {
        $(impl SettingValue for $t {
            fn to_setting_string(&self) -> String {
                serde_json::to_value(self)
                    .ok()
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_default()
            }
            fn parse_setting(raw: &str) -> Option<Self> {
                serde_json::from_value(serde_json::Value::String(raw.trim().to_string())).ok()
            }
        })*
    };
}

enum_setting_value!(Style, Complexity, Thickness, MaskMode, FrontEnd);

// =============================================================================
// Key registry
// =============================================================================

macro_rules! setting_keys {
    ($($variant:ident => $path:literal, $level:ident, $($field:ident).+;)*) => {
        /// Every externally overridable setting
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum SettingKey {
            $($variant,)*
        }

        impl SettingKey {
            /// Registry of all keys
            pub const ALL: &'static [SettingKey] = &[$(SettingKey::$variant,)*];

            /// Dotted path used for overrides
            pub fn path(self) -> &'static str {
                match self {
                    $(SettingKey::$variant => $path,)*
                }
            }

            /// Minimal recomputation when this key changes
            pub fn regen_level(self) -> RegenLevel {
                match self {
                    $(SettingKey::$variant => RegenLevel::$level,)*
                }
            }

            fn read(self, s: &Settings) -> String {
                match self {
                    $(SettingKey::$variant => s.$($field).+.to_setting_string(),)*
                }
            }

            fn write(self, s: &mut Settings, raw: &str) -> Result<()> {
                match self {
                    $(SettingKey::$variant => {
                        s.$($field).+ = SettingValue::parse_setting(raw).ok_or_else(|| {
                            Error::InvalidParameter(format!("{} = {:?}", $path, raw))
                        })?;
                    })*
                }
                Ok(())
            }
        }
    };
}

setting_keys! {
    Style => "generation.style", Api, generation.style;
    Complexity => "generation.complexity", Api, generation.complexity;
    Thickness => "generation.thickness", Reprocess, generation.thickness;
    FrontEnd => "front_end", Reprocess, front_end;
    MedianThreshold => "mask.median_threshold", Reprocess, mask.median_threshold;
    DespeckleMinSize => "mask.despeckle_min_size", Reprocess, mask.despeckle_min_size;
    GapClosingRadius => "mask.gap_closing_radius", Reprocess, mask.gap_closing_radius;
    EdgeBorderWidth => "mask.edge_border_width", Reprocess, mask.edge_border_width;
    MaskMode => "mask.mode", Reprocess, mask.mode;
    OutlineBlackRgbDistance => "repair.outline_black_rgb_distance", Reprocess, repair.outline_black_rgb_distance;
    ThickenPx => "repair.thicken_px", Reprocess, repair.thicken_px;
    CloseKernelPx => "repair.close_kernel_px", Reprocess, repair.close_kernel_px;
    OpenKernelPx => "repair.open_kernel_px", Reprocess, repair.open_kernel_px;
    BridgeEnabled => "repair.endpoint_bridge.enabled", Reprocess, repair.endpoint_bridge.enabled;
    MaxEndpointDistancePx => "repair.endpoint_bridge.max_endpoint_distance_px", Reprocess, repair.endpoint_bridge.max_endpoint_distance_px;
    MaxBridgesPerMegapixel => "repair.endpoint_bridge.max_bridges_per_megapixel", Reprocess, repair.endpoint_bridge.max_bridges_per_megapixel;
    AngleLimitDegrees => "repair.endpoint_bridge.angle_limit_degrees", Reprocess, repair.endpoint_bridge.angle_limit_degrees;
    ColorEdgeEnabled => "repair.color_edge_walls.enabled", Reprocess, repair.color_edge_walls.enabled;
    MinColorDeltaL2 => "repair.color_edge_walls.min_color_delta_l2", Reprocess, repair.color_edge_walls.min_color_delta_l2;
    ColorEdgeDilatePx => "repair.color_edge_walls.dilate_px", Reprocess, repair.color_edge_walls.dilate_px;
    LeakValidationEnabled => "repair.leak_validation.enabled", Reprocess, repair.leak_validation.enabled;
    SmallIslandTolerancePx => "repair.leak_validation.small_island_tolerance_px", Reprocess, repair.leak_validation.small_island_tolerance_px;
    StrengthenOnce => "repair.leak_validation.strengthen_once", Reprocess, repair.leak_validation.strengthen_once;
    SampleStep => "palette.sample_step", Palette, palette.sample_step;
    PaletteK => "palette.k", Palette, palette.k;
    MaxIterations => "palette.max_iterations", Palette, palette.max_iterations;
    BlackThreshold => "palette.black_threshold", Palette, palette.black_threshold;
    WhiteThreshold => "palette.white_threshold", Palette, palette.white_threshold;
    MinRegionSizeForHints => "hints.min_region_size_for_hints", Palette, hints.min_region_size_for_hints;
    MaxUndoSteps => "fill.max_undo_steps", Live, fill.max_undo_steps;
    CompletionRatio => "fill.completion_ratio", Live, fill.completion_ratio;
    CompletionMinRegions => "fill.completion_min_regions", Live, fill.completion_min_regions;
    SafeModeTolerance => "fill.safe_mode_tolerance", Live, fill.safe_mode_tolerance;
    OutlineOpacity => "display.outline_opacity", Live, display.outline_opacity;
    ShowHints => "display.show_hints", Live, display.show_hints;
}

impl SettingKey {
    /// Look up a key by its dotted path.
    pub fn from_path(path: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.path() == path)
            .ok_or_else(|| Error::UnknownSetting(path.to_string()))
    }
}

// =============================================================================
// Settings API
// =============================================================================

impl Settings {
    /// Parse settings from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Override one setting by dotted key.
    ///
    /// The settings are left unchanged when the new value is rejected.
    pub fn set(&mut self, path: &str, raw: &str) -> Result<RegenLevel> {
        let key = SettingKey::from_path(path)?;
        let mut candidate = self.clone();
        key.write(&mut candidate, raw)?;
        candidate.validate()?;
        *self = candidate;
        Ok(key.regen_level())
    }

    /// Current value of a setting as text.
    pub fn get(&self, path: &str) -> Result<String> {
        Ok(SettingKey::from_path(path)?.read(self))
    }

    /// Keys whose values differ between `self` and `other`.
    pub fn changed_keys(&self, other: &Settings) -> Vec<SettingKey> {
        SettingKey::ALL
            .iter()
            .copied()
            .filter(|k| k.read(self) != k.read(other))
            .collect()
    }

    /// Most expensive stage required to move from `self` to `other`.
    ///
    /// Returns `None` when nothing changed.
    pub fn regen_level_for(&self, other: &Settings) -> Option<RegenLevel> {
        self.changed_keys(other)
            .into_iter()
            .map(SettingKey::regen_level)
            .max()
    }

    /// Reject values no stage can work with.
    pub fn validate(&self) -> Result<()> {
        if self.palette.sample_step == 0 {
            return Err(Error::InvalidParameter(
                "palette.sample_step must be at least 1".into(),
            ));
        }
        if self.palette.k == 0 {
            return Err(Error::InvalidParameter("palette.k must be at least 1".into()));
        }
        if self.fill.max_undo_steps == 0 {
            return Err(Error::InvalidParameter(
                "fill.max_undo_steps must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.fill.completion_ratio) {
            return Err(Error::InvalidParameter(
                "fill.completion_ratio must be within [0, 1]".into(),
            ));
        }
        let angle = self.repair.endpoint_bridge.angle_limit_degrees;
        if !(0.0..=180.0).contains(&angle) {
            return Err(Error::InvalidParameter(
                "repair.endpoint_bridge.angle_limit_degrees must be within [0, 180]".into(),
            ));
        }
        if self.repair.endpoint_bridge.max_endpoint_distance_px < 0.0
            || self.repair.endpoint_bridge.max_bridges_per_megapixel < 0.0
            || self.repair.outline_black_rgb_distance < 0.0
            || self.repair.color_edge_walls.min_color_delta_l2 < 0.0
        {
            return Err(Error::InvalidParameter(
                "repair distances must be non-negative".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thickness_radius() {
        assert_eq!(Thickness::Thin.radius(), 1);
        assert_eq!(Thickness::Medium.radius(), 2);
        assert_eq!(Thickness::Thick.radius(), 3);
        assert_eq!(Thickness::Heavy.radius(), 5);
    }

    #[test]
    fn test_paths_are_unique() {
        let mut paths: Vec<_> = SettingKey::ALL.iter().map(|k| k.path()).collect();
        paths.sort_unstable();
        let n = paths.len();
        paths.dedup();
        assert_eq!(paths.len(), n);
    }

    #[test]
    fn test_every_key_roundtrips_through_get_set() {
        let defaults = Settings::default();
        for key in SettingKey::ALL {
            let mut s = defaults.clone();
            let value = s.get(key.path()).unwrap();
            s.set(key.path(), &value).unwrap();
            assert_eq!(s, defaults, "{}", key.path());
        }
    }

    #[test]
    fn test_set_reports_level() {
        let mut s = Settings::default();
        assert_eq!(s.set("generation.style", "mandala").unwrap(), RegenLevel::Api);
        assert_eq!(s.generation.style, Style::Mandala);
        assert_eq!(
            s.set("repair.endpoint_bridge.angle_limit_degrees", "20").unwrap(),
            RegenLevel::Reprocess
        );
        assert_eq!(s.repair.endpoint_bridge.angle_limit_degrees, 20.0);
        assert_eq!(s.set("display.show_hints", "true").unwrap(), RegenLevel::Live);
        assert_eq!(s.set("fill.safe_mode_tolerance", "90").unwrap(), RegenLevel::Live);
        assert_eq!(s.fill.safe_mode_tolerance, Some(90));
    }

    #[test]
    fn test_rejected_value_leaves_settings_unchanged() {
        let mut s = Settings::default();
        assert!(s.set("palette.k", "zero").is_err());
        assert!(s.set("palette.k", "0").is_err());
        assert!(s.set("no.such.key", "1").is_err());
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn test_regen_level_is_max_of_changes() {
        let old = Settings::default();
        let mut new = old.clone();
        assert_eq!(old.regen_level_for(&new), None);
        new.display.outline_opacity = 0.5;
        assert_eq!(old.regen_level_for(&new), Some(RegenLevel::Live));
        new.palette.k = 4;
        assert_eq!(old.regen_level_for(&new), Some(RegenLevel::Palette));
        new.mask.gap_closing_radius = 3;
        assert_eq!(old.regen_level_for(&new), Some(RegenLevel::Reprocess));
        new.generation.complexity = Complexity::High;
        assert_eq!(old.regen_level_for(&new), Some(RegenLevel::Api));
    }

    #[test]
    fn test_json_partial_document() {
        let s = Settings::from_json_str(
            r#"{ "mask": { "mode": "skeleton" }, "palette": { "k": 5 } }"#,
        )
        .unwrap();
        assert_eq!(s.mask.mode, MaskMode::Skeleton);
        assert_eq!(s.mask.median_threshold, 128);
        assert_eq!(s.palette.k, 5);
        let back = Settings::from_json_str(&s.to_json_string().unwrap()).unwrap();
        assert_eq!(back, s);
    }
}
