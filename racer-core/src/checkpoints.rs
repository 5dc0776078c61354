use std::collections::BTreeSet;

use crate::track::TilePos;

/// Checkpoints touched during the current run attempt. Order is not enforced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckpointTracker {
    visited: BTreeSet<TilePos>,
    total: usize,
}

impl CheckpointTracker {
    pub fn new(total: usize) -> Self {
        Self {
            visited: BTreeSet::new(),
            total,
        }
    }

    /// Marks `tile` if it is one of `checkpoints`. Returns true on a first visit.
    pub fn on_tick(&mut self, tile: TilePos, checkpoints: &[TilePos]) -> bool {
        if checkpoints.contains(&tile) {
            self.visited.insert(tile)
        } else {
            false
        }
    }

    pub fn is_complete(&self) -> bool {
        self.visited.len() >= self.total
    }

    pub fn is_visited(&self, tile: TilePos) -> bool {
        self.visited.contains(&tile)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// `(visited, total)` for a HUD counter.
    pub fn status(&self) -> (usize, usize) {
        (self.visited.len(), self.total)
    }

    pub fn reset(&mut self) {
        self.visited.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_checkpoints_is_complete() {
        assert!(CheckpointTracker::new(0).is_complete());
    }

    #[test]
    fn completes_in_any_order_and_ignores_repeats() {
        let checkpoints = [TilePos::new(2, 1), TilePos::new(5, 3)];
        let mut tracker = CheckpointTracker::new(checkpoints.len());

        assert!(!tracker.on_tick(TilePos::new(0, 0), &checkpoints));
        assert!(tracker.on_tick(TilePos::new(5, 3), &checkpoints));
        assert!(!tracker.on_tick(TilePos::new(5, 3), &checkpoints));
        assert_eq!(tracker.status(), (1, 2));
        assert!(!tracker.is_complete());

        assert!(tracker.on_tick(TilePos::new(2, 1), &checkpoints));
        assert!(tracker.is_complete());
        assert!(tracker.is_visited(TilePos::new(2, 1)));
    }

    #[test]
    fn reset_keeps_total() {
        let checkpoints = [TilePos::new(1, 1)];
        let mut tracker = CheckpointTracker::new(1);
        tracker.on_tick(TilePos::new(1, 1), &checkpoints);
        tracker.reset();
        assert_eq!(tracker.status(), (0, 1));
        assert!(!tracker.is_complete());
    }
}
