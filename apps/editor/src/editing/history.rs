//! Linear undo/redo over full snapshots of the block sequence.
//!
//! `index` ranges over `-1..len`; `None` stands for the `-1` "nothing loaded"
//! state. Whenever a snapshot is loaded, `snapshots[index]` is the collection
//! currently on screen.

use crate::models::ContentBlock;

pub type Snapshot = Vec<ContentBlock>;

#[derive(Debug, Clone, Default)]
pub struct History {
    snapshots: Vec<Snapshot>,
    index: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// History seeded with the collection loaded at session start.
    pub fn with_initial(blocks: Snapshot) -> Self {
        Self {
            snapshots: vec![blocks],
            index: Some(0),
        }
    }

    /// Records a genuine edit: drops any redo-able future, appends `blocks` and
    /// moves the cursor onto it. Undo/redo never come through here.
    pub fn record(&mut self, blocks: Snapshot) {
        let keep = self.index.map_or(0, |i| i + 1);
        self.snapshots.truncate(keep);
        self.snapshots.push(blocks);
        self.index = Some(self.snapshots.len() - 1);
    }

    /// Steps back one snapshot. `None` when already at the oldest.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if !self.can_undo() {
            return None;
        }
        let index = self.index? - 1;
        self.index = Some(index);
        self.snapshots.get(index)
    }

    /// Steps forward one snapshot. `None` when nothing has been undone.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if !self.can_redo() {
            return None;
        }
        let index = self.index.map_or(0, |i| i + 1);
        self.index = Some(index);
        self.snapshots.get(index)
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.index, Some(i) if i > 0)
    }

    pub fn can_redo(&self) -> bool {
        match self.index {
            Some(i) => i + 1 < self.snapshots.len(),
            None => false,
        }
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.index.and_then(|i| self.snapshots.get(i))
    }

    /// Cursor position; `-1` when no snapshot is loaded.
    pub fn index(&self) -> isize {
        self.index.map_or(-1, |i| i as isize)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{create_block, BlockPatch, BlockType};

    fn snap(labels: &[&str]) -> Snapshot {
        labels
            .iter()
            .map(|l| create_block(BlockType::Text, BlockPatch::content(*l)))
            .collect()
    }

    fn contents(s: &Snapshot) -> Vec<&str> {
        s.iter().map(|b| b.content.as_str()).collect()
    }

    #[test]
    fn test_empty_history_has_nothing_loaded() {
        let mut history = History::new();
        assert_eq!(history.index(), -1);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        assert!(history.current().is_none());
    }

    #[test]
    fn test_first_record_loads_index_zero() {
        let mut history = History::new();
        history.record(snap(&["a"]));
        assert_eq!(history.index(), 0);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_undo_then_redo_symmetry() {
        let initial = snap(&["a"]);
        let mut history = History::with_initial(initial.clone());
        let edits = [snap(&["a", "b"]), snap(&["a", "b", "c"]), snap(&["c"])];
        for e in &edits {
            history.record(e.clone());
        }

        for _ in 0..edits.len() {
            history.undo().unwrap();
        }
        assert_eq!(history.current(), Some(&initial));
        assert!(history.undo().is_none());

        for _ in 0..2 {
            history.redo().unwrap();
        }
        assert_eq!(contents(history.current().unwrap()), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_new_edit_truncates_redo() {
        let mut history = History::with_initial(snap(&["a"]));
        history.record(snap(&["b"]));
        history.record(snap(&["c"]));
        history.undo();
        history.undo();
        assert!(history.can_redo());

        history.record(snap(&["d"]));
        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
        assert_eq!(contents(history.current().unwrap()), vec!["d"]);
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_guards_match_index() {
        let mut history = History::with_initial(snap(&["a"]));
        history.record(snap(&["b"]));
        assert!(history.can_undo());
        assert!(!history.can_redo());
        history.undo();
        assert!(!history.can_undo());
        assert!(history.can_redo());
        assert_eq!(history.index(), 0);
    }
}
