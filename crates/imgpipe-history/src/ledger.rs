//! Operation ledger.
//!
//! The ledger runs alongside the image history. Entry `k` records the
//! operation that produced history snapshot `k + 1`; the origin has no
//! entry. The cursor follows the history cursor one position behind.
//! Undo and redo never shorten the ledger, so a redo tail survives until
//! the next recorded operation truncates it.

use crate::codec::EncodedParams;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, trace};

/// One committed operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationRecord {
    /// 1-based position in the ledger at recording time.
    pub step: u64,
    /// Registered operation name.
    #[serde(rename = "function_name")]
    pub operation: String,
    /// Encoded parameters.
    pub parameters: EncodedParams,
    /// When the operation was committed.
    pub timestamp: DateTime<Utc>,
}

impl OperationRecord {
    /// Creates a record stamped with the current instant.
    pub fn new(step: u64, operation: impl Into<String>, parameters: EncodedParams) -> Self {
        Self {
            step,
            operation: operation.into(),
            parameters,
            timestamp: Utc::now(),
        }
    }
}

/// Ordered operation records with a cursor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    records: Vec<OperationRecord>,
    index: Option<usize>,
    cleared: bool,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record after the cursor, truncating any tail first.
    pub fn record(&mut self, operation: &str, parameters: EncodedParams) -> &OperationRecord {
        let keep = self.index.map_or(0, |i| i + 1);
        if keep < self.records.len() {
            debug!(from = self.records.len(), to = keep, "Discarding ledger tail");
            self.records.truncate(keep);
        }
        let step = self.records.len() as u64 + 1;
        trace!(step, operation, "ledger record");
        self.records.push(OperationRecord::new(step, operation, parameters));
        self.cleared = false;
        let last = self.records.len() - 1;
        self.index = Some(last);
        &self.records[last]
    }

    /// Places the cursor at `history_index - 1`, clamped to the recorded
    /// range. Records are never removed here.
    pub fn sync_to_history_cursor(&mut self, history_index: Option<usize>) {
        self.index = match (history_index, self.records.len()) {
            (Some(h), len) if h > 0 && len > 0 => Some((h - 1).min(len - 1)),
            _ => None,
        };
        trace!(index = ?self.index, "ledger sync");
    }

    /// Records up to and including the cursor.
    pub fn visible_records(&self) -> &[OperationRecord] {
        let end = self.index.map_or(0, |i| i + 1);
        &self.records[..end]
    }

    /// All records, including any redo tail.
    pub fn records(&self) -> &[OperationRecord] {
        &self.records
    }

    /// Removes every record at the user's request. [`was_cleared`]
    /// reports `true` until the next [`record`].
    ///
    /// [`was_cleared`]: Self::was_cleared
    /// [`record`]: Self::record
    pub fn clear(&mut self) {
        debug!(len = self.records.len(), "Clearing ledger");
        self.reset();
        self.cleared = true;
    }

    /// Removes every record, as for a fresh source image.
    pub fn reset(&mut self) {
        self.records.clear();
        self.index = None;
        self.cleared = false;
    }

    /// Returns `true` if the ledger was emptied by [`clear`](Self::clear)
    /// and nothing has been recorded since.
    pub fn was_cleared(&self) -> bool {
        self.cleared
    }

    /// Cursor position.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Number of records, including any redo tail.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
