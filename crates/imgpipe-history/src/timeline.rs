//! Image history and operation ledger mutated as one unit.
//!
//! [`Timeline::commit_step`] is the only way an operation result enters the
//! history, and it always records the ledger entry in the same call. Undo
//! and redo move the history cursor and resync the ledger cursor. Outside
//! of an explicit [`clear_ledger`](Timeline::clear_ledger) the two stay
//! aligned: `ledger.index() == history.index() - 1`.

use crate::codec::EncodedParams;
use crate::history::HistoryStore;
use crate::ledger::{Ledger, OperationRecord};
use imgpipe_core::Image;
use tracing::{debug, info};

/// Paired image history and operation ledger.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    pub(crate) history: HistoryStore<Image>,
    pub(crate) ledger: Ledger,
}

impl Timeline {
    /// Creates an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts over from `origin`: one snapshot, no records.
    pub fn load_source(&mut self, origin: Image) {
        info!(image = %origin, "Loading source image");
        self.history.reset(origin);
        self.ledger.reset();
    }

    /// Image at the history cursor.
    pub fn current(&self) -> Option<&Image> {
        self.history.current()
    }

    /// First snapshot.
    pub fn origin(&self) -> Option<&Image> {
        self.history.get(0)
    }

    /// Commits `image` and records the operation that produced it.
    pub fn commit_step(
        &mut self,
        image: Image,
        operation: &str,
        parameters: EncodedParams,
    ) -> &OperationRecord {
        self.history.commit(image);
        let record = self.ledger.record(operation, parameters);
        debug!(step = record.step, operation, "Committed step");
        record
    }

    /// Steps back. Returns the new current image, or `None` at the origin.
    pub fn undo(&mut self) -> Option<&Image> {
        self.history.undo()?;
        self.ledger.sync_to_history_cursor(self.history.index());
        self.history.current()
    }

    /// Steps forward. Returns the new current image, or `None` at the end.
    pub fn redo(&mut self) -> Option<&Image> {
        self.history.redo()?;
        self.ledger.sync_to_history_cursor(self.history.index());
        self.history.current()
    }

    /// Drops every ledger record; the image history is untouched.
    pub fn clear_ledger(&mut self) {
        self.ledger.clear();
    }

    /// Keeps only the origin snapshot and drops every record.
    pub fn collapse_to_origin(&mut self) {
        self.history.collapse_to_origin();
        self.ledger.reset();
    }

    /// Image history.
    pub fn history(&self) -> &HistoryStore<Image> {
        &self.history
    }

    /// Operation ledger.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }
}
