//! Texture packing
//!
//! CPU side of the compositor: converts the data model into the byte
//! layouts the GPU textures expect, checks them against device limits, and
//! strips row padding from readback buffers. Nothing here needs a device.

use crate::error::{RenderError, RenderResult};
use tintmap_core::{LabelMap, WallMask};

/// Largest region id representable in the R16Uint label texture
pub const MAX_LABEL_ID: u32 = u16::MAX as u32;

/// Required alignment of `bytes_per_row` in texture-to-buffer copies
pub const ROW_ALIGNMENT: u32 = 256;

/// Check that a label map can be uploaded to a device
///
/// The palette texture is `max_region_id + 1` texels wide and must fit
/// `max_texture_dimension`.
pub fn check_region_limits(max_region_id: u32, max_texture_dimension: u32) -> RenderResult<()> {
    if max_region_id > MAX_LABEL_ID {
        return Err(RenderError::TooManyRegions { max_region_id });
    }
    let width = max_region_id + 1;
    if width > max_texture_dimension {
        return Err(RenderError::PaletteTooWide {
            width,
            limit: max_texture_dimension,
        });
    }
    Ok(())
}

/// Labels as little-endian u16 texels
pub fn pack_labels(labels: &LabelMap) -> RenderResult<Vec<u8>> {
    if labels.max_region_id() > MAX_LABEL_ID {
        return Err(RenderError::TooManyRegions {
            max_region_id: labels.max_region_id(),
        });
    }
    let mut bytes = Vec::with_capacity(labels.labels().len() * 2);
    for &l in labels.labels() {
        bytes.extend_from_slice(&(l as u16).to_le_bytes());
    }
    Ok(bytes)
}

/// Walls as one byte per texel, 1 = wall
pub fn pack_walls(mask: &WallMask) -> Vec<u8> {
    mask.data().iter().map(|&v| u8::from(v != 0)).collect()
}

/// Row pitch of a readback buffer for `unpadded` bytes of pixels per row
pub fn padded_bytes_per_row(unpadded: u32) -> u32 {
    unpadded.div_ceil(ROW_ALIGNMENT) * ROW_ALIGNMENT
}

/// Remove row padding from a readback buffer
pub fn unpad_rows(padded: &[u8], unpadded_row: usize, padded_row: usize, rows: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(unpadded_row * rows);
    for row in padded.chunks(padded_row).take(rows) {
        out.extend_from_slice(&row[..unpadded_row.min(row.len())]);
    }
    out
}
