//! Snapshot-based undo/redo history for a board's strokes.

use crate::stroke::{StrokeCollection, StrokeId};

/// Maximum number of undo steps kept; older snapshots are dropped.
pub const MAX_UNDO_HISTORY: usize = 50;

/// Linear undo/redo timeline of full stroke-collection snapshots.
///
/// `snapshots[step]` is always the active collection and `step` is always a
/// valid index; the timeline is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    snapshots: Vec<StrokeCollection>,
    step: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// A timeline holding only the empty collection.
    pub fn new() -> Self {
        Self::with_initial(StrokeCollection::new())
    }

    pub fn with_initial(initial: StrokeCollection) -> Self {
        Self {
            snapshots: vec![initial],
            step: 0,
        }
    }

    /// Record a new state. Anything that could have been redone is dropped.
    pub fn commit(&mut self, collection: StrokeCollection) {
        self.snapshots.truncate(self.step + 1);
        self.snapshots.push(collection);
        if self.snapshots.len() > MAX_UNDO_HISTORY + 1 {
            self.snapshots.remove(0);
        }
        self.step = self.snapshots.len() - 1;
    }

    /// Step back. Returns false at the start of the timeline.
    pub fn undo(&mut self) -> bool {
        if self.step == 0 {
            return false;
        }
        self.step -= 1;
        true
    }

    /// Step forward. Returns false at the end of the timeline.
    pub fn redo(&mut self) -> bool {
        if self.step + 1 >= self.snapshots.len() {
            return false;
        }
        self.step += 1;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.step > 0
    }

    pub fn can_redo(&self) -> bool {
        self.step + 1 < self.snapshots.len()
    }

    /// Replace the whole timeline with a single snapshot.
    ///
    /// Only for opening a board or its first authoritative load; using it for
    /// ordinary remote updates would wipe the user's undo stack.
    pub fn reset_to(&mut self, collection: StrokeCollection) {
        self.snapshots = vec![collection];
        self.step = 0;
    }

    /// The active snapshot.
    pub fn current(&self) -> &StrokeCollection {
        &self.snapshots[self.step]
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }

    /// True while nothing has happened on the board: one empty snapshot.
    pub fn is_pristine(&self) -> bool {
        self.snapshots.len() == 1 && self.snapshots[0].is_empty()
    }

    /// Swap a stroke id in every snapshot once the store has assigned its own.
    pub fn rename(&mut self, from: &StrokeId, to: &StrokeId) -> usize {
        self.snapshots
            .iter_mut()
            .filter_map(|snapshot| snapshot.rename(from, to).then_some(()))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::{test_stroke, Stroke};

    fn collection(ids: &[&str]) -> StrokeCollection {
        ids.iter()
            .enumerate()
            .map(|(i, id)| test_stroke(id, i as u32))
            .collect::<Vec<Stroke>>()
            .into()
    }

    #[test]
    fn test_new_history_is_pristine() {
        let history = History::new();
        assert!(history.is_pristine());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.snapshot_count(), 1);
    }

    #[test]
    fn test_commit_undo_redo() {
        let mut history = History::new();
        history.commit(collection(&["a"]));
        history.commit(collection(&["a", "b"]));
        assert_eq!(history.step(), 2);

        assert!(history.undo());
        assert_eq!(history.current(), &collection(&["a"]));
        assert!(history.can_redo());

        assert!(history.redo());
        assert_eq!(history.current(), &collection(&["a", "b"]));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_boundaries_are_no_ops() {
        let mut history = History::new();
        assert!(!history.undo());
        assert_eq!(history.step(), 0);

        history.commit(collection(&["a"]));
        assert!(!history.redo());
        assert_eq!(history.step(), 1);
    }

    #[test]
    fn test_commit_truncates_redo_tail() {
        let mut history = History::new();
        history.commit(collection(&["a"]));
        history.commit(collection(&["a", "b"]));
        history.undo();
        history.undo();

        history.commit(collection(&["c"]));
        assert_eq!(history.snapshot_count(), 2);
        assert!(!history.can_redo());
        assert!(history.undo());
        assert!(history.current().is_empty());
    }

    #[test]
    fn test_reset_to_replaces_everything() {
        let mut history = History::new();
        history.commit(collection(&["a"]));
        history.commit(collection(&["a", "b"]));

        history.reset_to(collection(&["x"]));
        assert_eq!(history.snapshot_count(), 1);
        assert_eq!(history.step(), 0);
        assert!(!history.can_undo());
        assert!(!history.is_pristine());
    }

    #[test]
    fn test_step_stays_in_range_under_mixed_sequence() {
        // Deterministic pseudo-random walk over commit/undo/redo.
        let mut history = History::new();
        let mut expected: Vec<StrokeCollection> = vec![StrokeCollection::new()];
        let mut step = 0usize;
        let mut seed: u32 = 0x2545_f491;
        for i in 0..500u32 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            match seed % 3 {
                0 => {
                    let next = collection(&[format!("s{}", i).as_str()]);
                    history.commit(next.clone());
                    expected.truncate(step + 1);
                    expected.push(next);
                    if expected.len() > MAX_UNDO_HISTORY + 1 {
                        expected.remove(0);
                    }
                    step = expected.len() - 1;
                }
                1 => {
                    history.undo();
                    step = step.saturating_sub(1);
                }
                _ => {
                    history.redo();
                    if step + 1 < expected.len() {
                        step += 1;
                    }
                }
            }
            assert!(history.step() < history.snapshot_count());
            assert_eq!(history.step(), step);
            assert_eq!(history.current(), &expected[step]);
        }
    }

    #[test]
    fn test_oldest_snapshots_are_dropped_past_the_limit() {
        let mut history = History::new();
        for i in 0..MAX_UNDO_HISTORY + 5 {
            history.commit(collection(&[format!("s{}", i).as_str()]));
        }
        assert_eq!(history.snapshot_count(), MAX_UNDO_HISTORY + 1);
        assert_eq!(history.step(), MAX_UNDO_HISTORY);

        let mut undone = 0;
        while history.undo() {
            undone += 1;
        }
        assert_eq!(undone, MAX_UNDO_HISTORY);
        assert_eq!(history.current(), &collection(&["s4"]));
        assert!(!history.is_pristine());
    }

    #[test]
    fn test_rename_touches_every_snapshot() {
        let mut history = History::new();
        history.commit(collection(&["tmp"]));
        history.commit(collection(&["tmp", "b"]));
        assert_eq!(history.rename(&StrokeId::new("tmp"), &StrokeId::new("k1")), 2);
        assert!(history.current().contains(&StrokeId::new("k1")));
        history.undo();
        assert!(history.current().contains(&StrokeId::new("k1")));
    }
}
