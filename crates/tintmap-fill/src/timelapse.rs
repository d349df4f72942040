//! Timelapse log
//!
//! One frame per applied fill or erase, in click order. Replaying the
//! frames from an empty coloring reproduces every intermediate state.

use serde::{Deserialize, Serialize};
use tintmap_core::{RegionColorMap, Rgb};

/// One logged click
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelapseFrame {
    /// Image pixel that was clicked
    pub x: u32,
    pub y: u32,
    pub region_id: u32,
    /// `None` for an erase
    pub color: Option<Rgb>,
}

impl TimelapseFrame {
    /// Apply this frame to a coloring
    pub fn apply(&self, colors: &mut RegionColorMap) {
        match self.color {
            Some(c) => {
                colors.set(self.region_id, c);
            }
            None => {
                colors.remove(self.region_id);
            }
        }
    }
}

/// Ordered list of frames
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimelapseLog {
    frames: Vec<TimelapseFrame>,
}

impl TimelapseLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_frames(frames: Vec<TimelapseFrame>) -> Self {
        Self { frames }
    }

    pub fn push(&mut self, frame: TimelapseFrame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<TimelapseFrame> {
        self.frames.pop()
    }

    pub fn frames(&self) -> &[TimelapseFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Coloring after each frame, starting from `base`
    pub fn replay(&self, base: &RegionColorMap) -> Vec<RegionColorMap> {
        let mut current = base.clone();
        self.frames
            .iter()
            .map(|frame| {
                frame.apply(&mut current);
                current.clone()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay() {
        let red = Rgb::new(255, 0, 0);
        let log = TimelapseLog::from_frames(vec![
            TimelapseFrame {
                x: 0,
                y: 0,
                region_id: 1,
                color: Some(red),
            },
            TimelapseFrame {
                x: 3,
                y: 0,
                region_id: 2,
                color: Some(red),
            },
            TimelapseFrame {
                x: 0,
                y: 0,
                region_id: 1,
                color: None,
            },
        ]);
        let states = log.replay(&RegionColorMap::new());
        assert_eq!(states.len(), 3);
        assert_eq!(states[1].len(), 2);
        assert_eq!(states[2].get(1), None);
        assert_eq!(states[2].get(2), Some(red));
    }
}
