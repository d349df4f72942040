//! tintmap-fill - Interactive region coloring
//!
//! - [`FillEngine`]: fill and erase by click, bounded undo/redo, timelapse
//!   logging, one-shot completion, and optional safe mode
//! - [`History`]: the snapshot ring behind undo
//! - [`TimelapseLog`]: replayable click log
//! - [`render_composite`]: CPU rendering for export

pub mod composite;
pub mod engine;
mod error;
pub mod history;
pub mod timelapse;

pub use error::{FillError, FillResult};

pub use composite::render_composite;
pub use engine::{ClickOutcome, CompletionEvent, FillEngine, ProgressSnapshot, Tool};
pub use history::History;
pub use timelapse::{TimelapseFrame, TimelapseLog};
