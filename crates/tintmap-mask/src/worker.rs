//! Off-thread repair jobs
//!
//! [`RepairWorker::submit`] moves the raster into a dedicated thread and
//! returns a [`RepairJob`] handle. The result comes back over a channel
//! tagged with the job's generation; each submit bumps the generation and
//! cancels the job it supersedes. A result whose generation is no longer
//! the latest is reported as [`JobOutcome::Stale`] and must not be
//! committed.

use crate::error::MaskError;
use crate::repair::{RepairOutput, repair_with_cancel};
use log::{debug, warn};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::thread;
use std::time::Duration;
use tintmap_core::RasterImage;
use tintmap_core::config::RepairParams;

/// Final state of a repair job
#[derive(Debug)]
pub enum JobOutcome {
    /// The job finished and is still the latest submission
    Completed(RepairOutput),
    /// The job failed; previously committed state is untouched
    Failed { cause: String },
    /// A newer job was submitted; the result must be discarded
    Stale,
    /// The job was cancelled before it finished
    Cancelled,
    /// `wait` gave up before the job finished
    TimedOut,
}

/// Spawns repair jobs and tracks the latest generation
#[derive(Debug, Default)]
pub struct RepairWorker {
    latest: Arc<AtomicU64>,
    active_cancel: Option<Arc<AtomicBool>>,
}

/// Handle to one submitted repair job
#[derive(Debug)]
pub struct RepairJob {
    generation: u64,
    latest: Arc<AtomicU64>,
    cancel: Arc<AtomicBool>,
    rx: Receiver<(u64, Result<RepairOutput, MaskError>)>,
}

impl RepairWorker {
    /// Create a worker with no jobs
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation of the most recent submission (0 before the first)
    pub fn latest_generation(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }

    /// Move `raster` into a new worker thread and start repairing it
    ///
    /// The previous job, if any, is cancelled and becomes stale.
    pub fn submit(&mut self, raster: RasterImage, params: RepairParams) -> RepairJob {
        if let Some(previous) = self.active_cancel.take() {
            previous.store(true, Ordering::Release);
        }
        let generation = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        let cancel = Arc::new(AtomicBool::new(false));
        self.active_cancel = Some(Arc::clone(&cancel));

        let (tx, rx) = mpsc::channel();
        let thread_cancel = Arc::clone(&cancel);
        let spawned = thread::Builder::new()
            .name(format!("tintmap-repair-{}", generation))
            .spawn(move || {
                let result = catch_unwind(AssertUnwindSafe(|| {
                    repair_with_cancel(&raster, &params, &thread_cancel)
                }))
                .unwrap_or_else(|panic| {
                    Err(MaskError::WorkerFailed {
                        cause: panic_message(panic.as_ref()),
                    })
                });
                // the handle may already be gone
                let _ = tx.send((generation, result));
            });

        if let Err(e) = spawned {
            warn!("repair job {} could not start: {}", generation, e);
        } else {
            debug!("repair job {} submitted", generation);
        }

        RepairJob {
            generation,
            latest: Arc::clone(&self.latest),
            cancel,
            rx,
        }
    }

    /// Make every outstanding job stale without starting a new one
    ///
    /// Used when the committed state changes by other means; results still
    /// in flight then resolve as [`JobOutcome::Stale`]. Returns the new
    /// generation.
    pub fn supersede(&mut self) -> u64 {
        self.cancel_active();
        let generation = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        debug!("repair jobs before generation {} superseded", generation);
        generation
    }

    /// Cancel the active job, if any
    pub fn cancel_active(&mut self) {
        if let Some(cancel) = self.active_cancel.take() {
            cancel.store(true, Ordering::Release);
        }
    }
}

impl RepairJob {
    /// Generation this job was submitted with
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a newer job has been submitted since this one
    pub fn is_stale(&self) -> bool {
        self.latest.load(Ordering::Acquire) != self.generation
    }

    /// Ask the job to stop at its next stage boundary
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    /// Check for a result without blocking
    ///
    /// Returns `None` while the job is still running. The result is
    /// delivered once.
    pub fn poll(&mut self) -> Option<JobOutcome> {
        match self.rx.try_recv() {
            Ok(message) => Some(self.resolve(message)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(self.disconnected()),
        }
    }

    /// Block until the job finishes or `timeout` elapses
    pub fn wait(self, timeout: Duration) -> JobOutcome {
        match self.rx.recv_timeout(timeout) {
            Ok(message) => self.resolve(message),
            Err(RecvTimeoutError::Timeout) => {
                warn!("repair job {} timed out after {:?}", self.generation, timeout);
                self.cancel();
                JobOutcome::TimedOut
            }
            Err(RecvTimeoutError::Disconnected) => self.disconnected(),
        }
    }

    fn resolve(&self, (generation, result): (u64, Result<RepairOutput, MaskError>)) -> JobOutcome {
        if generation != self.latest.load(Ordering::Acquire) {
            warn!("discarding stale repair result {}", generation);
            return JobOutcome::Stale;
        }
        match result {
            Ok(output) => JobOutcome::Completed(output),
            Err(MaskError::Cancelled) => JobOutcome::Cancelled,
            Err(e) => {
                warn!("repair job {} failed: {}", generation, e);
                JobOutcome::Failed {
                    cause: e.to_string(),
                }
            }
        }
    }

    fn disconnected(&self) -> JobOutcome {
        JobOutcome::Failed {
            cause: "repair worker exited without a result".to_string(),
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "repair worker panicked".to_string()
    }
}
