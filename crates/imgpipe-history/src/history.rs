//! Linear snapshot history with a cursor.
//!
//! The store is a plain sequence plus the index of the current entry.
//! Committing while the cursor sits before the end discards everything
//! after it (the redo branch is gone for good). Undo and redo only move
//! the cursor.
//!
//! ```text
//! commit A, B, C      [A B C]  cursor 2
//! undo                [A B C]  cursor 1
//! commit D            [A B D]  cursor 2
//! ```

use tracing::{debug, trace};

/// Snapshot sequence with an optional cursor (`None` only when empty).
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryStore<T> {
    items: Vec<T>,
    index: Option<usize>,
}

impl<T> Default for HistoryStore<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: None,
        }
    }
}

impl<T> HistoryStore<T> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `item` after the cursor, truncating any redo tail first.
    pub fn commit(&mut self, item: T) {
        let keep = self.index.map_or(0, |i| i + 1);
        if keep < self.items.len() {
            debug!(from = self.items.len(), to = keep, "Discarding redo branch");
            self.items.truncate(keep);
        }
        self.items.push(item);
        self.index = Some(self.items.len() - 1);
        trace!(index = ?self.index, len = self.items.len(), "history commit");
    }

    /// Steps back. Returns the new current entry, or `None` if already at
    /// the first entry.
    pub fn undo(&mut self) -> Option<&T> {
        match self.index {
            Some(i) if i > 0 => {
                self.index = Some(i - 1);
                trace!(index = i - 1, "history undo");
                self.items.get(i - 1)
            }
            _ => None,
        }
    }

    /// Steps forward. Returns the new current entry, or `None` if already at
    /// the last entry.
    pub fn redo(&mut self) -> Option<&T> {
        match self.index {
            Some(i) if i + 1 < self.items.len() => {
                self.index = Some(i + 1);
                trace!(index = i + 1, "history redo");
                self.items.get(i + 1)
            }
            _ => None,
        }
    }

    /// Entry at the cursor.
    pub fn current(&self) -> Option<&T> {
        self.index.and_then(|i| self.items.get(i))
    }

    /// Entry at `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Cursor position.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Number of stored entries, including the redo tail.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing has been committed.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns `true` if [`undo`](Self::undo) would move the cursor.
    pub fn can_undo(&self) -> bool {
        matches!(self.index, Some(i) if i > 0)
    }

    /// Returns `true` if [`redo`](Self::redo) would move the cursor.
    pub fn can_redo(&self) -> bool {
        matches!(self.index, Some(i) if i + 1 < self.items.len())
    }

    /// Replaces the whole sequence with a single `origin` entry.
    pub fn reset(&mut self, origin: T) {
        self.items.clear();
        self.items.push(origin);
        self.index = Some(0);
    }

    /// Keeps only the first entry and points the cursor at it.
    pub fn collapse_to_origin(&mut self) {
        self.items.truncate(1);
        self.index = if self.items.is_empty() { None } else { Some(0) };
    }

    /// Iterates entries from oldest to newest.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(n: u32) -> HistoryStore<u32> {
        let mut h = HistoryStore::new();
        for i in 0..n {
            h.commit(i);
        }
        h
    }

    #[test]
    fn test_empty() {
        let mut h: HistoryStore<u32> = HistoryStore::new();
        assert_eq!(h.index(), None);
        assert!(h.current().is_none());
        assert!(h.undo().is_none());
        assert!(h.redo().is_none());
        assert!(!h.can_undo() && !h.can_redo());
    }

    #[test]
    fn test_commits_advance_cursor() {
        let h = store(4);
        assert_eq!(h.len(), 4);
        assert_eq!(h.index(), Some(3));
        assert_eq!(h.current(), Some(&3));
    }

    #[test]
    fn test_undo_redo_bounds() {
        let mut h = store(3);
        assert_eq!(h.undo(), Some(&1));
        assert_eq!(h.undo(), Some(&0));
        assert_eq!(h.undo(), None);
        assert_eq!(h.index(), Some(0));
        assert_eq!(h.redo(), Some(&1));
        assert_eq!(h.redo(), Some(&2));
        assert_eq!(h.redo(), None);
        assert_eq!(h.index(), Some(2));
    }

    #[test]
    fn test_commit_after_undo_truncates() {
        let mut h = store(4);
        h.undo();
        h.undo();
        h.commit(9);
        assert_eq!(h.iter().copied().collect::<Vec<_>>(), vec![0, 1, 9]);
        assert!(!h.can_redo());
    }

    #[test]
    fn test_reset_and_collapse() {
        let mut h = store(3);
        h.collapse_to_origin();
        assert_eq!(h.len(), 1);
        assert_eq!(h.current(), Some(&0));

        h.commit(5);
        h.reset(7);
        assert_eq!(h.len(), 1);
        assert_eq!(h.index(), Some(0));
        assert_eq!(h.current(), Some(&7));

        let mut empty: HistoryStore<u32> = HistoryStore::new();
        empty.collapse_to_origin();
        assert_eq!(empty.index(), None);
    }
}
