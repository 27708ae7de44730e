use std::collections::VecDeque;

use super::Snapshot;
use crate::document::SceneState;
use crate::error::{SurfaceError, SurfaceResult};

/// Hard cap on undo entries, including the initial state.
pub const MAX_HISTORY_DEPTH: usize = 50;

/// Snapshot-based undo/redo.
///
/// The top of the undo stack always mirrors the live scene. The bottom entry is
/// the floor: undo never pops it, so undoing right after initialization is a
/// no-op.
#[derive(Debug)]
pub struct SnapshotHistory {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: Vec<Snapshot>,
    limit: usize,
}

impl SnapshotHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            limit: limit.clamp(1, MAX_HISTORY_DEPTH),
        }
    }

    /// Discards everything and starts over from `initial`.
    pub fn reset(&mut self, initial: Snapshot) {
        self.clear();
        self.undo_stack.push_back(initial);
    }

    /// Records the state produced by a mutation. Any redo branch is dropped.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.push_undo(snapshot);
        if !self.redo_stack.is_empty() {
            log::debug!("Dropping {} redo entries", self.redo_stack.len());
            self.redo_stack.clear();
        }
    }

    fn push_undo(&mut self, snapshot: Snapshot) {
        self.undo_stack.push_back(snapshot);
        while self.undo_stack.len() > self.limit {
            self.undo_stack.pop_front();
        }
    }

    /// Steps back one entry and returns the state to restore.
    ///
    /// The target snapshot is decoded before either stack is touched, so a
    /// corrupt entry leaves the history exactly as it was.
    pub fn undo(&mut self) -> SurfaceResult<SceneState> {
        if !self.can_undo() {
            return Err(SurfaceError::NothingToUndo);
        }
        let target = self.undo_stack.len() - 2;
        let state = self.undo_stack[target].decode()?;
        if let Some(current) = self.undo_stack.pop_back() {
            self.redo_stack.push(current);
        }
        Ok(state)
    }

    /// Re-applies the most recently undone entry and returns the state to restore.
    pub fn redo(&mut self) -> SurfaceResult<SceneState> {
        let snapshot = self.redo_stack.last().ok_or(SurfaceError::NothingToRedo)?;
        let state = snapshot.decode()?;
        if let Some(snapshot) = self.redo_stack.pop() {
            self.push_undo(snapshot);
        }
        Ok(state)
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Entries on the undo stack, floor included
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for SnapshotHistory {
    fn default() -> Self {
        Self::new(MAX_HISTORY_DEPTH)
    }
}
