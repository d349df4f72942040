//! Bounded undo history
//!
//! A ring of [`RegionColorMap`] snapshots with a cursor. The first snapshot
//! is the state the history was created with. Pushing drops everything
//! after the cursor and evicts the oldest snapshot once the ring is full,
//! so at most `capacity - 1` steps can be undone.

use std::collections::VecDeque;
use tintmap_core::RegionColorMap;

#[derive(Debug, Clone)]
pub struct History {
    snapshots: VecDeque<RegionColorMap>,
    cursor: usize,
    capacity: usize,
}

impl History {
    /// Start a history at `initial`. A capacity of 0 is treated as 1.
    pub fn new(capacity: usize, initial: RegionColorMap) -> Self {
        let capacity = capacity.max(1);
        let mut snapshots = VecDeque::with_capacity(capacity);
        snapshots.push_back(initial);
        Self {
            snapshots,
            cursor: 0,
            capacity,
        }
    }

    /// Record a new state after the cursor
    pub fn push(&mut self, state: RegionColorMap) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push_back(state);
        while self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }
        self.cursor = self.snapshots.len() - 1;
    }

    /// Step back; `None` at the oldest snapshot
    pub fn undo(&mut self) -> Option<&RegionColorMap> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.snapshots.get(self.cursor)
    }

    /// Step forward again; `None` when nothing was undone
    pub fn redo(&mut self) -> Option<&RegionColorMap> {
        if self.cursor + 1 >= self.snapshots.len() {
            return None;
        }
        self.cursor += 1;
        self.snapshots.get(self.cursor)
    }

    /// Change the capacity, evicting the oldest snapshots if needed
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.snapshots.len() > self.capacity {
            if self.cursor == 0 {
                self.snapshots.pop_back();
            } else {
                self.snapshots.pop_front();
                self.cursor -= 1;
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
