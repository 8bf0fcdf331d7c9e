//! Linear snapshot undo/redo.
//!
//! Every mutation pushes a deep clone of the whole element list. At the
//! element counts a template reaches this is cheap, and wholesale
//! replacement on undo keeps the editor state machine trivial. The stack
//! is bounded: past the cap the oldest snapshot is evicted, so very long
//! sessions lose the most distant undo steps first.

/// Maximum number of snapshots retained.
pub const HISTORY_CAP: usize = 50;

/// A bounded snapshot stack with a cursor. New snapshots truncate any
/// redo tail, exactly like a browser history.
#[derive(Debug, Clone)]
pub struct History<T: Clone> {
    snapshots: Vec<T>,
    cursor: usize,
}

impl<T: Clone> History<T> {
    pub fn new(initial: T) -> Self {
        Self {
            snapshots: vec![initial],
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Record a new state. Discards anything past the cursor and evicts
    /// the oldest snapshot once the cap is reached.
    pub fn push(&mut self, state: T) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(state);
        if self.snapshots.len() > HISTORY_CAP {
            self.snapshots.remove(0);
        }
        self.cursor = self.snapshots.len() - 1;
    }

    /// Step back, returning the state to restore.
    pub fn undo(&mut self) -> Option<T> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(self.snapshots[self.cursor].clone())
    }

    /// Step forward, returning the state to restore.
    pub fn redo(&mut self) -> Option<T> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(self.snapshots[self.cursor].clone())
    }

    /// Current state (the snapshot under the cursor).
    pub fn current(&self) -> &T {
        &self.snapshots[self.cursor]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn undo_redo_walk_the_stack() {
        let mut h = History::new(0);
        h.push(1);
        h.push(2);
        h.push(3);
        assert_eq!(h.undo(), Some(2));
        assert_eq!(h.undo(), Some(1));
        assert_eq!(h.redo(), Some(2));
        assert_eq!(h.redo(), Some(3));
        assert_eq!(h.redo(), None);
    }

    #[test]
    fn undo_stops_at_the_initial_state() {
        let mut h = History::new(0);
        h.push(1);
        assert_eq!(h.undo(), Some(0));
        assert_eq!(h.undo(), None);
        assert_eq!(*h.current(), 0);
    }

    #[test]
    fn push_truncates_the_redo_tail() {
        let mut h = History::new(0);
        h.push(1);
        h.push(2);
        h.undo();
        h.push(9);
        assert_eq!(h.redo(), None);
        assert_eq!(h.undo(), Some(1));
        assert_eq!(h.redo(), Some(9));
    }

    #[test]
    fn cap_evicts_the_oldest_snapshot() {
        let mut h = History::new(0);
        for i in 1..=HISTORY_CAP + 10 {
            h.push(i);
        }
        assert_eq!(h.len(), HISTORY_CAP);
        // Walk all the way back: the earliest states are gone.
        let mut last = None;
        while let Some(s) = h.undo() {
            last = Some(s);
        }
        assert_eq!(last, Some(11));
    }
}
