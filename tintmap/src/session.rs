//! Session context
//!
//! A [`Session`] owns one coloring job from raster to finished picture:
//!
//! 1. [`Session::load_raster`] stores the illustration and reprocesses it,
//!    either synchronously through the wall-mask builder or by submitting a
//!    repair job ([`FrontEnd`]).
//! 2. A committed [`Scene`] holds the wall mask, labels, palette, hints and
//!    the [`FillEngine`]; clicks, undo and redo go through it.
//! 3. [`Session::apply_settings`] reruns only the stage the changed keys
//!    require.
//! 4. [`Session::reset`] drops everything, cancelling any running job.
//!
//! Repair results are committed only when their generation is still the
//! latest; a stale, cancelled or failed job leaves the committed scene as
//! it was.

use crate::bundle::Bundle;
use crate::error::{TintmapError, TintmapResult};
use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tintmap_color::{RegionHint, analyze_hints, extract_palette};
use tintmap_core::config::FrontEnd;
use tintmap_core::{LabelMap, RasterImage, RegenLevel, Rgb, Settings, WallMask};
use tintmap_fill::{ClickOutcome, FillEngine, ProgressSnapshot, Tool};
use tintmap_mask::{JobOutcome, RepairJob, RepairStats, RepairWorker, build_wall_mask};
use tintmap_region::label_regions;

/// State of the repair front end after a poll
#[derive(Debug, Clone, PartialEq)]
pub enum RepairPoll {
    /// No job is pending
    Idle,
    /// The job is still running
    Pending,
    /// The result became the current scene
    Committed(RepairStats),
    /// The result was stale or cancelled and was dropped
    Discarded,
    /// `wait_repair` gave up; the job keeps its cancel request
    TimedOut,
}

/// Everything derived from one processed raster
#[derive(Debug, Clone)]
pub struct Scene {
    mask: Arc<WallMask>,
    labels: Arc<LabelMap>,
    palette: Vec<Rgb>,
    hints: Vec<RegionHint>,
    engine: FillEngine,
    repair_stats: Option<RepairStats>,
}

impl Scene {
    pub fn mask(&self) -> &WallMask {
        &self.mask
    }

    pub fn labels(&self) -> &LabelMap {
        &self.labels
    }

    pub fn palette(&self) -> &[Rgb] {
        &self.palette
    }

    pub fn hints(&self) -> &[RegionHint] {
        &self.hints
    }

    pub fn engine(&self) -> &FillEngine {
        &self.engine
    }

    /// Counters of the repair run that produced this scene
    pub fn repair_stats(&self) -> Option<&RepairStats> {
        self.repair_stats.as_ref()
    }
}

/// One coloring job
#[derive(Debug)]
pub struct Session {
    settings: Settings,
    seed: u64,
    raster: Option<Arc<RasterImage>>,
    vector_overlay: Option<String>,
    scene: Option<Scene>,
    worker: RepairWorker,
    pending: Option<RepairJob>,
}

impl Session {
    /// Create an empty session
    pub fn new(settings: Settings) -> TintmapResult<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            seed: rand::random(),
            raster: None,
            vector_overlay: None,
            scene: None,
            worker: RepairWorker::new(),
            pending: None,
        })
    }

    /// Fix the palette seed so extraction is reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn raster(&self) -> Option<&RasterImage> {
        self.raster.as_deref()
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    /// Generation of the pending repair job, if any
    pub fn pending_generation(&self) -> Option<u64> {
        self.pending.as_ref().map(RepairJob::generation)
    }

    /// Opaque vector outlines carried into exported bundles
    pub fn set_vector_overlay(&mut self, overlay: Option<String>) {
        self.vector_overlay = overlay;
    }

    fn scene_mut(&mut self) -> TintmapResult<&mut Scene> {
        self.scene.as_mut().ok_or(TintmapError::NoScene)
    }

    // -------------------------------------------------------------------------
    // Processing
    // -------------------------------------------------------------------------

    /// Store a new raster and process it
    ///
    /// With the builder front end the scene is ready on return; with the
    /// repair front end a job is submitted and the previous scene is dropped
    /// until [`Session::poll_repair`] commits the result. Either way a repair
    /// job still running on the old raster can no longer commit.
    pub fn load_raster(&mut self, raster: RasterImage) -> TintmapResult<()> {
        info!("load_raster: {}x{}", raster.width(), raster.height());
        self.raster = Some(Arc::new(raster));
        self.scene = None;
        self.reprocess()
    }

    /// Rebuild mask, labels and palette from the stored raster
    pub fn reprocess(&mut self) -> TintmapResult<()> {
        match self.settings.front_end {
            FrontEnd::Builder => {
                let raster = self.raster.clone().ok_or(TintmapError::NoRaster)?;
                self.supersede_pending();
                let start = Instant::now();
                let mask = build_wall_mask(
                    &raster,
                    &self.settings.mask,
                    self.settings.generation.thickness,
                )?;
                let labels = label_regions(&mask)?;
                self.commit(mask, labels, None)?;
                info!("reprocess: done in {:?}", start.elapsed());
                Ok(())
            }
            FrontEnd::Repair => self.submit_repair().map(|_| ()),
        }
    }

    /// Start a repair job on the stored raster, superseding any pending one
    ///
    /// Returns the job's generation.
    pub fn submit_repair(&mut self) -> TintmapResult<u64> {
        let raster = self.raster.as_deref().ok_or(TintmapError::NoRaster)?;
        let job = self
            .worker
            .submit(raster.clone(), self.settings.repair.clone());
        let generation = job.generation();
        self.pending = Some(job);
        debug!("submit_repair: generation {}", generation);
        Ok(generation)
    }

    /// Check the pending repair job without blocking
    ///
    /// A failed job returns [`TintmapError::RepairFailed`] and leaves the
    /// committed scene untouched.
    pub fn poll_repair(&mut self) -> TintmapResult<RepairPoll> {
        let Some(job) = self.pending.as_mut() else {
            return Ok(RepairPoll::Idle);
        };
        match job.poll() {
            None => Ok(RepairPoll::Pending),
            Some(outcome) => {
                self.pending = None;
                self.resolve(outcome)
            }
        }
    }

    /// Block on the pending repair job for at most `timeout`
    pub fn wait_repair(&mut self, timeout: Duration) -> TintmapResult<RepairPoll> {
        let Some(job) = self.pending.take() else {
            return Ok(RepairPoll::Idle);
        };
        self.resolve(job.wait(timeout))
    }

    fn resolve(&mut self, outcome: JobOutcome) -> TintmapResult<RepairPoll> {
        match outcome {
            JobOutcome::Completed(output) => {
                let stats = output.stats.clone();
                info!(
                    "repair committed: {} bridges, {} islands removed, {} regions in {:?}",
                    stats.bridges,
                    stats.islands_removed,
                    output.labels.max_region_id(),
                    stats.elapsed
                );
                self.commit(output.mask, output.labels, Some(stats.clone()))?;
                Ok(RepairPoll::Committed(stats))
            }
            JobOutcome::Stale | JobOutcome::Cancelled => Ok(RepairPoll::Discarded),
            JobOutcome::TimedOut => Ok(RepairPoll::TimedOut),
            JobOutcome::Failed { cause } => {
                warn!("repair failed: {}", cause);
                Err(TintmapError::RepairFailed { cause })
            }
        }
    }

    /// Install a new scene; the coloring starts empty
    fn commit(
        &mut self,
        mask: WallMask,
        labels: LabelMap,
        repair_stats: Option<RepairStats>,
    ) -> TintmapResult<()> {
        let raster = self.raster.clone().ok_or(TintmapError::NoRaster)?;
        let palette = self.extract_palette(&raster)?;
        self.install(mask, labels, palette, raster, repair_stats)
    }

    fn install(
        &mut self,
        mask: WallMask,
        labels: LabelMap,
        palette: Vec<Rgb>,
        raster: Arc<RasterImage>,
        repair_stats: Option<RepairStats>,
    ) -> TintmapResult<()> {
        let hints = analyze_hints(&labels, &raster, &palette, &self.settings.hints)?;
        let mask = Arc::new(mask);
        let labels = Arc::new(labels);
        let engine = FillEngine::new(
            Arc::clone(&labels),
            Arc::clone(&mask),
            self.settings.fill.clone(),
            self.settings.hints.min_region_size_for_hints,
        )?
        .with_reference(raster)?;
        debug!(
            "scene: {} regions, {} palette colors, {} hints",
            labels.max_region_id(),
            palette.len(),
            hints.len()
        );
        self.scene = Some(Scene {
            mask,
            labels,
            palette,
            hints,
            engine,
            repair_stats,
        });
        Ok(())
    }

    fn extract_palette(&self, raster: &RasterImage) -> TintmapResult<Vec<Rgb>> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        Ok(extract_palette(raster, &self.settings.palette, &mut rng)?)
    }

    // -------------------------------------------------------------------------
    // Settings
    // -------------------------------------------------------------------------

    /// Replace the settings and rerun the cheapest sufficient stage
    ///
    /// Returns the level that was applied, or `None` when nothing changed.
    /// [`RegenLevel::Api`] changes are recorded but need a new raster from
    /// the illustration generator.
    pub fn apply_settings(&mut self, settings: Settings) -> TintmapResult<Option<RegenLevel>> {
        settings.validate()?;
        let level = self.settings.regen_level_for(&settings);
        self.settings = settings;

        match level {
            None => {}
            Some(RegenLevel::Live) => self.apply_live()?,
            Some(RegenLevel::Palette) => {
                self.apply_live()?;
                self.refresh_palette()?;
            }
            Some(RegenLevel::Reprocess) => {
                if self.raster.is_some() {
                    self.reprocess()?;
                }
            }
            Some(RegenLevel::Api) => {
                info!("settings changed at api level; waiting for a regenerated raster");
            }
        }
        debug!("apply_settings: {:?}", level);
        Ok(level)
    }

    /// Override one setting by dotted key
    pub fn set(&mut self, key: &str, value: &str) -> TintmapResult<Option<RegenLevel>> {
        let mut settings = self.settings.clone();
        settings.set(key, value)?;
        self.apply_settings(settings)
    }

    fn apply_live(&mut self) -> TintmapResult<()> {
        let fill = self.settings.fill.clone();
        if let Some(scene) = self.scene.as_mut() {
            scene.engine.set_settings(fill)?;
        }
        Ok(())
    }

    fn refresh_palette(&mut self) -> TintmapResult<()> {
        let Some(raster) = self.raster.clone() else {
            return Ok(());
        };
        if self.scene.is_none() {
            return Ok(());
        }
        let palette = self.extract_palette(&raster)?;
        let hint_settings = self.settings.hints.clone();
        let scene = self.scene_mut()?;
        scene.hints = analyze_hints(&scene.labels, &raster, &palette, &hint_settings)?;
        scene.palette = palette;
        // completion counts the same regions the hints cover
        scene
            .engine
            .set_min_region_size(hint_settings.min_region_size_for_hints);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Coloring
    // -------------------------------------------------------------------------

    /// Click at a screen point through the engine's viewport
    pub fn click(&mut self, sx: f64, sy: f64, tool: Tool) -> TintmapResult<ClickOutcome> {
        Ok(self.scene_mut()?.engine.click(sx, sy, tool))
    }

    /// Fill with a palette swatch by index
    pub fn fill_with_swatch(
        &mut self,
        sx: f64,
        sy: f64,
        swatch: usize,
    ) -> TintmapResult<ClickOutcome> {
        let scene = self.scene_mut()?;
        let Some(&color) = scene.palette.get(swatch) else {
            return Err(TintmapError::Core(tintmap_core::Error::InvalidParameter(
                format!("palette has no swatch {}", swatch),
            )));
        };
        Ok(scene.engine.click(sx, sy, Tool::Fill(color)))
    }

    pub fn undo(&mut self) -> TintmapResult<bool> {
        Ok(self.scene_mut()?.engine.undo())
    }

    pub fn redo(&mut self) -> TintmapResult<bool> {
        Ok(self.scene_mut()?.engine.redo())
    }

    /// Direct access to the fill engine, e.g. to move the viewport
    pub fn engine_mut(&mut self) -> TintmapResult<&mut FillEngine> {
        Ok(&mut self.scene_mut()?.engine)
    }

    /// Palette texels to upload to the compositor after a fill or undo
    pub fn palette_texels(&self) -> TintmapResult<Vec<u8>> {
        let scene = self.scene.as_ref().ok_or(TintmapError::NoScene)?;
        Ok(scene.engine.palette_texels())
    }

    /// Copy of the coloring progress for autosave
    pub fn autosave(&self) -> Option<ProgressSnapshot> {
        self.scene.as_ref().map(|s| s.engine.snapshot())
    }

    /// Continue from saved progress on the current scene
    pub fn resume(&mut self, snapshot: ProgressSnapshot) -> TintmapResult<()> {
        self.scene_mut()?.engine.restore(snapshot)?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    /// Bundle of the current scene, including progress once coloring began
    pub fn export_bundle(&self, id: &str, name: &str) -> TintmapResult<Bundle> {
        let scene = self.scene.as_ref().ok_or(TintmapError::NoScene)?;
        let mut bundle = Bundle::new(id, name, &scene.labels, &scene.palette);
        bundle.layers.outlines = self.vector_overlay.clone();
        let progress = scene.engine.snapshot();
        if !progress.timelapse.is_empty() || !progress.colors.is_empty() {
            bundle.progress = Some(progress);
        }
        Ok(bundle)
    }

    /// Reopen a bundle over its reference raster
    ///
    /// The saved labels and palette are used as they are; nothing is
    /// reprocessed.
    pub fn load_bundle(&mut self, bundle: Bundle, reference: RasterImage) -> TintmapResult<()> {
        bundle.validate()?;
        let labels = bundle.label_map()?;
        let mask = bundle.wall_mask()?;
        mask.check_same_size(reference.width(), reference.height())?;
        let palette = bundle.palette_colors()?;

        self.cancel_pending();
        let raster = Arc::new(reference);
        self.raster = Some(Arc::clone(&raster));
        self.vector_overlay = bundle.layers.outlines;
        self.install(mask, labels, palette, raster, None)?;
        if let Some(progress) = bundle.progress {
            self.resume(progress)?;
        }
        info!("load_bundle: {}", bundle.manifest.id);
        Ok(())
    }

    /// Keep the pending job so its result is still reported, but as stale
    fn supersede_pending(&mut self) {
        if self.pending.is_some() {
            let generation = self.worker.supersede();
            debug!("pending repair superseded by generation {}", generation);
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(job) = self.pending.take() {
            job.cancel();
        }
        self.worker.cancel_active();
    }

    /// Drop the raster, the scene and any pending job
    pub fn reset(&mut self) {
        self.cancel_pending();
        self.raster = None;
        self.vector_overlay = None;
        self.scene = None;
        debug!("session reset");
    }
}
