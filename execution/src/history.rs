use liftoff_types::CrashPoint;
use std::collections::VecDeque;

/// Most-recent-first record of past crash points with a fixed capacity.
#[derive(Clone, Debug, PartialEq)]
pub struct CrashHistory {
    capacity: usize,
    entries: VecDeque<CrashPoint>,
}

impl CrashHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Record a crash point, evicting the oldest entry when full.
    pub fn push(&mut self, point: CrashPoint) {
        if self.capacity == 0 {
            return;
        }
        self.entries.push_front(point);
        self.entries.truncate(self.capacity);
    }

    pub fn latest(&self) -> Option<CrashPoint> {
        self.entries.front().copied()
    }

    pub fn to_vec(&self) -> Vec<CrashPoint> {
        self.entries.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
