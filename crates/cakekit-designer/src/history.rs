//! Linear undo/redo history of design snapshots.
//!
//! A list of snapshots plus a cursor. Committing after an undo destroys the
//! redo branch. Undo and redo at a boundary are no-ops, never errors.

use crate::snapshot::Snapshot;

/// Snapshot history with a cursor (`None` when empty).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryBuffer {
    entries: Vec<Snapshot>,
    cursor: Option<usize>,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a snapshot after the cursor, discarding any redo-able future.
    pub fn commit(&mut self, snapshot: Snapshot) {
        let keep = self.cursor.map_or(0, |c| c + 1);
        self.entries.truncate(keep);
        self.entries.push(snapshot);
        self.cursor = Some(self.entries.len() - 1);
    }

    /// Step back one entry and return it, or `None` at the bottom.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        match self.cursor {
            Some(c) if c > 0 => {
                self.cursor = Some(c - 1);
                self.entries.get(c - 1)
            }
            _ => None,
        }
    }

    /// Step forward one entry and return it, or `None` at the top.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        let next = self.cursor.map_or(0, |c| c + 1);
        if self.cursor.is_none() || next >= self.entries.len() {
            return None;
        }
        self.cursor = Some(next);
        self.entries.get(next)
    }

    /// Drop every entry; the cursor returns to "before the first entry".
    pub fn reset(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }

    pub fn current_index(&self) -> Option<usize> {
        self.cursor
    }

    /// Cursor in the signed convention where an empty history is `-1`.
    pub fn current_index_signed(&self) -> i64 {
        self.cursor.map_or(-1, |c| c as i64)
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.cursor.and_then(|c| self.entries.get(c))
    }

    pub fn entries(&self) -> &[Snapshot] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.cursor.is_some_and(|c| c + 1 < self.entries.len())
    }

    /// Number of undo steps available.
    pub fn undo_depth(&self) -> usize {
        self.cursor.unwrap_or(0)
    }

    /// Number of redo steps available.
    pub fn redo_depth(&self) -> usize {
        self.cursor
            .map_or(0, |c| self.entries.len().saturating_sub(c + 1))
    }
}
