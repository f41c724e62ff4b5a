//! Bounded undo/redo stacks of document snapshots.
//!
//! Entries hold `Arc<Document>` snapshots, so recording one costs a pointer copy. The stacks
//! are owned by [`EditorState`](crate::EditorState) behind an `Arc` and copied on write.

use crate::document::Document;
use crate::selection::SelectionState;
use std::sync::Arc;

/// A document snapshot plus the selection to restore with it.
#[derive(Debug, Clone)]
pub(crate) struct HistoryEntry {
    pub(crate) document: Arc<Document>,
    pub(crate) selection: SelectionState,
}

/// Undo and redo stacks.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    max_depth: usize,
}

impl History {
    /// Empty history keeping at most `max_depth` undo entries.
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth,
        }
    }

    /// Whether an undo entry exists.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether a redo entry exists.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of undo entries.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of redo entries.
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Bound of the undo stack.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub(crate) fn record(&mut self, entry: HistoryEntry) {
        self.redo_stack.clear();
        if self.max_depth == 0 {
            return;
        }
        if self.undo_stack.len() >= self.max_depth {
            let overflow = self.undo_stack.len() + 1 - self.max_depth;
            self.undo_stack.drain(..overflow);
        }
        self.undo_stack.push(entry);
    }

    pub(crate) fn clear_redo(&mut self) {
        self.redo_stack.clear();
    }

    /// Pop the newest undo entry, parking `current` on the redo stack.
    pub(crate) fn step_back(&mut self, current: HistoryEntry) -> Option<HistoryEntry> {
        let entry = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        Some(entry)
    }

    /// Pop the newest redo entry, parking `current` on the undo stack.
    pub(crate) fn step_forward(&mut self, current: HistoryEntry) -> Option<HistoryEntry> {
        let entry = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        Some(entry)
    }
}
