//! Fill engine
//!
//! Owns the coloring state of one session: the [`RegionColorMap`], its
//! bounded [`History`], and the [`TimelapseLog`]. A click is resolved
//! through the [`Viewport`] to an image pixel and then to a region; clicks
//! off the canvas or on a wall are ignored without error.
//!
//! Completion fires once per engine when strictly more than
//! `completion_ratio` of the qualifying regions are colored and there are
//! strictly more than `completion_min_regions` of them. A region qualifies
//! when it has at least `min_region_size` pixels.

use crate::composite::render_composite;
use crate::error::{FillError, FillResult};
use crate::history::History;
use crate::timelapse::{TimelapseFrame, TimelapseLog};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tintmap_core::config::FillSettings;
use tintmap_core::{
    LabelMap, RasterImage, RegionColorMap, Rgb, Viewport, WALL_REGION, WallMask,
};
use tintmap_region::qualifying_regions;

/// What a click does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    /// Color the region
    Fill(Rgb),
    /// Remove the region's color
    Erase,
}

/// Fired once when enough of the picture is colored
#[derive(Debug, Clone)]
pub struct CompletionEvent {
    /// The finished picture
    pub composite: RasterImage,
    /// Every applied click, for replay
    pub timelapse: Vec<TimelapseFrame>,
    /// Colored qualifying regions at the time of firing
    pub colored: usize,
    /// All qualifying regions
    pub qualifying: usize,
}

/// Result of a click
#[derive(Debug, Clone)]
pub enum ClickOutcome {
    /// Off the canvas or on a wall
    Ignored,
    /// Safe mode refused the fill; nothing changed
    Rejected { reference: Rgb, distance: u32 },
    /// The click changed the coloring
    Applied {
        region_id: u32,
        completion: Option<Box<CompletionEvent>>,
    },
}

/// Coloring progress that can be saved and resumed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub colors: RegionColorMap,
    pub timelapse: TimelapseLog,
}

/// Interactive coloring state for one label map
#[derive(Debug, Clone)]
pub struct FillEngine {
    labels: Arc<LabelMap>,
    mask: Arc<WallMask>,
    reference: Option<Arc<RasterImage>>,
    settings: FillSettings,
    viewport: Viewport,
    colors: RegionColorMap,
    history: History,
    timelapse: TimelapseLog,
    redo_frames: Vec<TimelapseFrame>,
    qualifying: Vec<bool>,
    qualifying_total: usize,
    completed: bool,
}

impl FillEngine {
    /// Create an engine with an empty coloring
    ///
    /// `mask` and `labels` must be registered 1:1.
    pub fn new(
        labels: Arc<LabelMap>,
        mask: Arc<WallMask>,
        settings: FillSettings,
        min_region_size: u32,
    ) -> FillResult<Self> {
        mask.check_same_size(labels.width(), labels.height())?;
        check_settings(&settings)?;

        let (qualifying, qualifying_total) = qualifying_table(&labels, min_region_size);
        debug!(
            "fill engine: {} regions, {} qualifying (min size {})",
            labels.max_region_id(),
            qualifying_total,
            min_region_size
        );

        Ok(Self {
            history: History::new(settings.max_undo_steps, RegionColorMap::new()),
            labels,
            mask,
            reference: None,
            settings,
            viewport: Viewport::IDENTITY,
            colors: RegionColorMap::new(),
            timelapse: TimelapseLog::new(),
            redo_frames: Vec::new(),
            qualifying,
            qualifying_total,
            completed: false,
        })
    }

    /// Attach the reference illustration used by safe mode
    pub fn with_reference(mut self, reference: Arc<RasterImage>) -> FillResult<Self> {
        self.mask
            .check_same_size(reference.width(), reference.height())?;
        self.reference = Some(reference);
        Ok(self)
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn labels(&self) -> &Arc<LabelMap> {
        &self.labels
    }

    pub fn mask(&self) -> &Arc<WallMask> {
        &self.mask
    }

    pub fn colors(&self) -> &RegionColorMap {
        &self.colors
    }

    pub fn timelapse(&self) -> &TimelapseLog {
        &self.timelapse
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn settings(&self) -> &FillSettings {
        &self.settings
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Whether completion has fired
    pub fn is_complete(&self) -> bool {
        self.completed
    }

    /// Number of colored regions
    pub fn colored_count(&self) -> usize {
        self.colors.len()
    }

    /// `(colored qualifying regions, qualifying regions)`
    pub fn progress(&self) -> (usize, usize) {
        let colored = self
            .colors
            .iter()
            .filter(|(id, _)| self.qualifying.get(*id as usize).copied().unwrap_or(false))
            .count();
        (colored, self.qualifying_total)
    }

    /// Palette lookup table for the compositor
    pub fn palette_texels(&self) -> Vec<u8> {
        self.colors.palette_texels(self.labels.max_region_id())
    }

    /// Render the current coloring on the CPU
    pub fn composite(&self) -> FillResult<RasterImage> {
        render_composite(&self.labels, &self.mask, &self.colors)
    }

    /// Apply live settings; a smaller history evicts the oldest steps
    pub fn set_settings(&mut self, settings: FillSettings) -> FillResult<()> {
        check_settings(&settings)?;
        self.history.set_capacity(settings.max_undo_steps);
        self.settings = settings;
        Ok(())
    }

    /// Recount the qualifying regions for a new minimum size
    ///
    /// The coloring is kept; completion that already fired stays fired.
    pub fn set_min_region_size(&mut self, min_region_size: u32) {
        let (qualifying, total) = qualifying_table(&self.labels, min_region_size);
        self.qualifying = qualifying;
        self.qualifying_total = total;
        debug!("qualifying regions: {} (min size {})", total, min_region_size);
    }

    // -------------------------------------------------------------------------
    // Interaction
    // -------------------------------------------------------------------------

    /// Click at a screen point
    pub fn click(&mut self, sx: f64, sy: f64, tool: Tool) -> ClickOutcome {
        match self
            .viewport
            .to_image(sx, sy, self.labels.width(), self.labels.height())
        {
            Some((x, y)) => self.click_pixel(x, y, tool),
            None => ClickOutcome::Ignored,
        }
    }

    /// Click at an image pixel
    pub fn click_pixel(&mut self, x: u32, y: u32, tool: Tool) -> ClickOutcome {
        let region_id = match self.labels.region_at(x, y) {
            Some(id) if id != WALL_REGION => id,
            _ => return ClickOutcome::Ignored,
        };

        if let Tool::Fill(color) = tool {
            if let Some(rejected) = self.safe_mode_check(x, y, color) {
                return rejected;
            }
        }

        let color = match tool {
            Tool::Fill(c) => {
                self.colors.set(region_id, c);
                Some(c)
            }
            Tool::Erase => {
                self.colors.remove(region_id);
                None
            }
        };
        self.history.push(self.colors.clone());
        self.timelapse.push(TimelapseFrame {
            x,
            y,
            region_id,
            color,
        });
        self.redo_frames.clear();
        debug!("click ({}, {}) -> region {} {:?}", x, y, region_id, color);

        ClickOutcome::Applied {
            region_id,
            completion: self.check_completion().map(Box::new),
        }
    }

    fn safe_mode_check(&self, x: u32, y: u32, color: Rgb) -> Option<ClickOutcome> {
        let tolerance = self.settings.safe_mode_tolerance?;
        let reference = self.reference.as_ref()?.rgb(x, y)?;
        let distance = reference.l1_distance(color);
        if distance > tolerance {
            warn!(
                "safe mode rejected {} at ({}, {}): reference {}, distance {}",
                color, x, y, reference, distance
            );
            return Some(ClickOutcome::Rejected {
                reference,
                distance,
            });
        }
        None
    }

    fn check_completion(&mut self) -> Option<CompletionEvent> {
        if self.completed {
            return None;
        }
        let (colored, total) = self.progress();
        if !self.threshold_met(colored, total) {
            return None;
        }
        self.completed = true;
        info!("completion: {} of {} qualifying regions colored", colored, total);

        let composite = match self.composite() {
            Ok(image) => image,
            Err(e) => {
                warn!("completion composite failed: {}", e);
                return None;
            }
        };
        Some(CompletionEvent {
            composite,
            timelapse: self.timelapse.frames().to_vec(),
            colored,
            qualifying: total,
        })
    }

    fn threshold_met(&self, colored: usize, total: usize) -> bool {
        total > self.settings.completion_min_regions as usize
            && colored as f64 / total as f64 > self.settings.completion_ratio
    }

    /// Step back one click; returns `false` at the oldest snapshot
    pub fn undo(&mut self) -> bool {
        let Some(state) = self.history.undo() else {
            return false;
        };
        self.colors = state.clone();
        if let Some(frame) = self.timelapse.pop() {
            self.redo_frames.push(frame);
        }
        true
    }

    /// Re-apply an undone click; returns `false` when there is none
    pub fn redo(&mut self) -> bool {
        let Some(state) = self.history.redo() else {
            return false;
        };
        self.colors = state.clone();
        if let Some(frame) = self.redo_frames.pop() {
            self.timelapse.push(frame);
        }
        true
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    /// Copy of the current progress for autosave
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            colors: self.colors.clone(),
            timelapse: self.timelapse.clone(),
        }
    }

    /// Resume from saved progress
    ///
    /// History restarts at the restored coloring. If the restored progress
    /// already meets the completion threshold, completion does not fire
    /// again. Saved colors and frames must name regions in
    /// `1..=max_region_id`; the wall region is never colored.
    pub fn restore(&mut self, snapshot: ProgressSnapshot) -> FillResult<()> {
        let max = self.labels.max_region_id();
        let ids = snapshot
            .colors
            .iter()
            .map(|(id, _)| id)
            .chain(snapshot.timelapse.frames().iter().map(|f| f.region_id));
        for id in ids {
            if id == WALL_REGION || id > max {
                return Err(FillError::UnknownRegion {
                    region_id: id,
                    max_region_id: max,
                });
            }
        }

        self.colors = snapshot.colors;
        self.timelapse = snapshot.timelapse;
        self.history = History::new(self.settings.max_undo_steps, self.colors.clone());
        self.redo_frames.clear();
        let (colored, total) = self.progress();
        self.completed = self.threshold_met(colored, total);
        debug!(
            "restored {} colors, {} frames",
            self.colors.len(),
            self.timelapse.len()
        );
        Ok(())
    }

    /// Coloring after each logged click, starting from nothing
    pub fn replay_frames(&self) -> Vec<RegionColorMap> {
        self.timelapse.replay(&RegionColorMap::new())
    }
}

/// Per-id qualifying flags and their count
fn qualifying_table(labels: &LabelMap, min_region_size: u32) -> (Vec<bool>, usize) {
    let mut qualifying = vec![false; labels.max_region_id() as usize + 1];
    let ids = qualifying_regions(labels, min_region_size);
    for &id in &ids {
        qualifying[id as usize] = true;
    }
    (qualifying, ids.len())
}

fn check_settings(settings: &FillSettings) -> FillResult<()> {
    if !(0.0..=1.0).contains(&settings.completion_ratio) {
        return Err(FillError::InvalidParameters(format!(
            "completion_ratio must be within [0, 1], got {}",
            settings.completion_ratio
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = Rgb::new(255, 0, 0);

    fn plus_engine(settings: FillSettings) -> FillEngine {
        let mask = WallMask::from_ascii(&[".#..", "####", ".#..", ".#.."]).unwrap();
        let labels =
            LabelMap::from_vec(4, 4, vec![1, 0, 2, 2, 0, 0, 0, 0, 3, 0, 4, 4, 3, 0, 4, 4])
                .unwrap();
        FillEngine::new(Arc::new(labels), Arc::new(mask), settings, 1).unwrap()
    }

    #[test]
    fn test_fill_then_erase() {
        let mut engine = plus_engine(FillSettings::default());
        let before = engine.labels().as_ref().clone();
        assert!(matches!(
            engine.click_pixel(2, 0, Tool::Fill(RED)),
            ClickOutcome::Applied { region_id: 2, .. }
        ));
        assert_eq!(engine.colors().get(2), Some(RED));
        engine.click_pixel(3, 0, Tool::Erase);
        assert!(engine.colors().is_empty());
        assert_eq!(engine.labels().as_ref(), &before);
        assert_eq!(engine.timelapse().len(), 2);
    }

    #[test]
    fn test_walls_and_off_canvas_ignored() {
        let mut engine = plus_engine(FillSettings::default());
        assert!(matches!(engine.click_pixel(1, 0, Tool::Fill(RED)), ClickOutcome::Ignored));
        assert!(matches!(engine.click(-1.0, 0.0, Tool::Fill(RED)), ClickOutcome::Ignored));
        assert!(matches!(engine.click(4.0, 0.0, Tool::Fill(RED)), ClickOutcome::Ignored));
        assert!(engine.timelapse().is_empty());
        assert!(!engine.history().can_undo());
    }

    #[test]
    fn test_click_through_viewport() {
        let mut engine = plus_engine(FillSettings::default());
        engine.set_viewport(Viewport::new(10.0, 10.0, 4.0));
        // screen (22, 10) -> image (3, 0), region 2
        assert!(matches!(
            engine.click(22.0, 10.0, Tool::Fill(RED)),
            ClickOutcome::Applied { region_id: 2, .. }
        ));
    }

    #[test]
    fn test_undo_closure_and_redo() {
        let mut engine = plus_engine(FillSettings::default());
        engine.click_pixel(0, 0, Tool::Fill(RED));
        engine.click_pixel(2, 2, Tool::Fill(Rgb::new(0, 255, 0)));
        engine.click_pixel(0, 0, Tool::Erase);
        assert!(engine.undo());
        assert_eq!(engine.colors().get(1), Some(RED));
        assert!(engine.redo());
        assert_eq!(engine.colors().get(1), None);
        assert_eq!(engine.timelapse().len(), 3);
        for _ in 0..3 {
            assert!(engine.undo());
        }
        assert!(!engine.undo());
        assert!(engine.colors().is_empty());
        assert!(engine.timelapse().is_empty());
    }

    #[test]
    fn test_safe_mode() {
        let settings = FillSettings {
            safe_mode_tolerance: Some(30),
            ..Default::default()
        };
        let reference = RasterImage::filled(4, 4, Rgb::new(250, 10, 0)).unwrap();
        let mut engine = plus_engine(settings)
            .with_reference(Arc::new(reference))
            .unwrap();
        match engine.click_pixel(0, 0, Tool::Fill(Rgb::new(0, 0, 255))) {
            ClickOutcome::Rejected { distance, .. } => assert_eq!(distance, 250 + 10 + 255),
            other => panic!("unexpected {:?}", other),
        }
        assert!(engine.colors().is_empty());
        assert!(matches!(
            engine.click_pixel(0, 0, Tool::Fill(RED)),
            ClickOutcome::Applied { .. }
        ));
        // erase is never checked
        assert!(matches!(
            engine.click_pixel(0, 0, Tool::Erase),
            ClickOutcome::Applied { .. }
        ));
    }

    #[test]
    fn test_snapshot_restore_replay() {
        let mut engine = plus_engine(FillSettings::default());
        engine.click_pixel(0, 0, Tool::Fill(RED));
        engine.click_pixel(3, 3, Tool::Fill(RED));
        let saved = engine.snapshot();

        let mut resumed = plus_engine(FillSettings::default());
        resumed.restore(saved.clone()).unwrap();
        assert_eq!(resumed.colors(), engine.colors());
        assert!(!resumed.undo());
        let states = resumed.replay_frames();
        assert_eq!(states.len(), 2);
        assert_eq!(states.last(), Some(engine.colors()));

        let mut bad = saved;
        bad.colors.set(99, RED);
        assert!(matches!(
            resumed.restore(bad),
            Err(FillError::UnknownRegion { region_id: 99, .. })
        ));
    }

    #[test]
    fn test_min_region_size_recounts_progress() {
        let mut engine = plus_engine(FillSettings::default());
        engine.click_pixel(0, 0, Tool::Fill(RED));
        engine.click_pixel(3, 3, Tool::Fill(RED));
        assert_eq!(engine.progress(), (2, 4));

        // only region 4 has four pixels
        engine.set_min_region_size(4);
        assert_eq!(engine.progress(), (1, 1));
        assert_eq!(engine.colored_count(), 2);

        engine.set_min_region_size(1);
        assert_eq!(engine.progress(), (2, 4));
    }

    #[test]
    fn test_restore_rejects_wall_region() {
        let mut engine = plus_engine(FillSettings::default());
        let colors: RegionColorMap =
            serde_json::from_str(r##"{"0":"#ff0000","2":"#ff0000"}"##).unwrap();
        let snapshot = ProgressSnapshot {
            colors,
            timelapse: TimelapseLog::new(),
        };
        assert!(matches!(
            engine.restore(snapshot),
            Err(FillError::UnknownRegion { region_id: 0, .. })
        ));
        assert_eq!(engine.colored_count(), 0);
        assert!(engine.colors().is_empty());
    }
}
