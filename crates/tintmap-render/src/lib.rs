//! tintmap-render - GPU compositing of colored label maps
//!
//! - [`Compositor`]: wgpu render pipeline with label, wall and palette
//!   textures; palette-only uploads per fill
//! - [`textures`]: CPU-side texture packing and device limit checks

pub mod compositor;
mod error;
pub mod textures;

pub use error::{RenderError, RenderResult};

pub use compositor::{Compositor, FrameParams};
pub use textures::{MAX_LABEL_ID, check_region_limits};
