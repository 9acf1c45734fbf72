//! Undo/redo history of whole-canvas stroke snapshots.

use crate::config::{MAX_HISTORY, MAX_STROKES};
use crate::stroke::Stroke;
use std::sync::Arc;

/// Ordered committed strokes (insertion order is z-order).
///
/// Cloning copies only the `Arc` handles, so a snapshot is cheap.
pub type StrokeList = Vec<Arc<Stroke>>;

/// Trim the oldest strokes so at most `cap` remain. Returns how many were dropped.
pub fn trim_to_cap(strokes: &mut StrokeList, cap: usize) -> usize {
    let excess = strokes.len().saturating_sub(cap);
    if excess > 0 {
        strokes.drain(..excess);
    }
    excess
}

/// Undo and redo stacks plus the stroke cap enforced on every commit.
#[derive(Debug, Clone)]
pub struct History {
    /// Snapshots to restore on undo, newest last.
    undo_stack: Vec<StrokeList>,
    /// Snapshots to restore on redo, newest last.
    redo_stack: Vec<StrokeList>,
    /// Maximum number of undo snapshots kept.
    max_depth: usize,
    /// Maximum number of committed strokes.
    max_strokes: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(MAX_STROKES, MAX_HISTORY)
    }
}

impl History {
    pub fn new(max_strokes: usize, max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth,
            max_strokes,
        }
    }

    pub fn max_strokes(&self) -> usize {
        self.max_strokes
    }

    /// Apply a mutation to `strokes` as one undoable step.
    ///
    /// The pre-mutation sequence is pushed on the undo stack, the redo stack is
    /// cleared, and the stroke cap is enforced on the result. Returns the number
    /// of strokes trimmed by the cap.
    pub fn commit(&mut self, strokes: &mut StrokeList, mutate: impl FnOnce(&mut StrokeList)) -> usize {
        let before = strokes.clone();
        mutate(strokes);
        let trimmed = trim_to_cap(strokes, self.max_strokes);

        self.undo_stack.push(before);
        self.redo_stack.clear();

        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        trimmed
    }

    /// Restore the previous snapshot.
    /// Returns true if undo was performed, false if nothing to undo.
    pub fn undo(&mut self, strokes: &mut StrokeList) -> bool {
        if let Some(snapshot) = self.undo_stack.pop() {
            let current = std::mem::replace(strokes, snapshot);
            self.redo_stack.push(current);
            true
        } else {
            false
        }
    }

    /// Re-apply the last undone snapshot.
    /// Returns true if redo was performed, false if nothing to redo.
    pub fn redo(&mut self, strokes: &mut StrokeList) -> bool {
        if let Some(snapshot) = self.redo_stack.pop() {
            let current = std::mem::replace(strokes, snapshot);
            self.undo_stack.push(current);
            true
        } else {
            false
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Every stroke id referenced by any stored snapshot.
    pub fn referenced_ids(&self) -> impl Iterator<Item = crate::stroke::StrokeId> + '_ {
        self.undo_stack
            .iter()
            .chain(self.redo_stack.iter())
            .flat_map(|snapshot| snapshot.iter().map(|stroke| stroke.id()))
    }
}
