//! Transactional replay of recorded operations.
//!
//! A replay runs a list of [`OperationRecord`]s against a [`Timeline`] one
//! at a time. Either every record succeeds and is committed, or the first
//! failure restores the timeline from a [`Checkpoint`] taken before the
//! first record ran. Callers never observe a partially applied replay.
//!
//! # Modes
//!
//! - [`ReplayMode::Append`] runs on top of the current image. Commits follow
//!   the usual fork rule, so a redo tail is discarded.
//! - [`ReplayMode::RestartFromOrigin`] first collapses the history to the
//!   origin and clears the ledger, then proceeds as `Append`.
//!
//! # Example
//!
//! ```rust
//! use imgpipe_core::Image;
//! use imgpipe_history::{EnumResolution, Replayer, ReplayMode, Timeline};
//! use imgpipe_history::document::parse;
//! use imgpipe_ops::OperationRegistry;
//!
//! let doc = parse(br#"{"processing_pipeline": {"functions_applied": [
//!     {"function_name": "Invert", "parameters": {}}
//! ]}}"#).unwrap();
//!
//! let mut timeline = Timeline::new();
//! timeline.load_source(Image::filled(4, 4, 3, 10).unwrap());
//!
//! let registry = OperationRegistry::builtin();
//! let report = Replayer::new(&registry, EnumResolution::Schema)
//!     .replay(&mut timeline, &doc.operations, ReplayMode::Append)
//!     .unwrap();
//! assert_eq!(report.applied, 1);
//! assert_eq!(timeline.current().unwrap().data()[0], 245);
//! ```

use crate::codec::EnumResolution;
use crate::error::{PipelineError, PipelineResult, ReplayError};
use crate::history::HistoryStore;
use crate::ledger::{Ledger, OperationRecord};
use crate::timeline::Timeline;
use imgpipe_core::{EnumType, Image};
use imgpipe_ops::{OperationRegistry, OpsError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

/// Where replayed records start from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayMode {
    /// Continue from the current image.
    #[default]
    Append,
    /// Discard everything after the origin first.
    RestartFromOrigin,
}

/// Outcome of a successful replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayReport {
    /// Records committed.
    pub applied: usize,
    /// Mode the replay ran in.
    pub mode: ReplayMode,
}

/// Saved timeline state, restored verbatim on rollback.
///
/// Snapshots share their pixel buffers, so capturing is a copy of handles
/// and records rather than of image data.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    history: HistoryStore<Image>,
    ledger: Ledger,
}

impl Checkpoint {
    /// Captures `timeline`.
    pub fn capture(timeline: &Timeline) -> Self {
        Self {
            history: timeline.history.clone(),
            ledger: timeline.ledger.clone(),
        }
    }

    /// Puts `timeline` back into the captured state.
    pub fn restore(self, timeline: &mut Timeline) {
        timeline.history = self.history;
        timeline.ledger = self.ledger;
    }
}

/// Runs records through an [`OperationRegistry`].
pub struct Replayer<'a> {
    registry: &'a OperationRegistry,
    resolution: EnumResolution,
    known: Vec<&'static EnumType>,
}

impl<'a> Replayer<'a> {
    /// Creates a replayer decoding enum parameters with `resolution`.
    pub fn new(registry: &'a OperationRegistry, resolution: EnumResolution) -> Self {
        Self {
            registry,
            resolution,
            known: registry.enum_types(),
        }
    }

    /// Replays `records` against `timeline`, all or nothing.
    ///
    /// # Errors
    ///
    /// [`PipelineError::NoImage`] if `timeline` has no image, otherwise
    /// [`PipelineError::Replay`] naming the record that stopped the replay.
    /// On error the timeline is exactly as it was before the call.
    pub fn replay(
        &self,
        timeline: &mut Timeline,
        records: &[OperationRecord],
        mode: ReplayMode,
    ) -> PipelineResult<ReplayReport> {
        if timeline.current().is_none() {
            return Err(PipelineError::NoImage);
        }
        info!(records = records.len(), ?mode, "Replaying pipeline");

        let checkpoint = Checkpoint::capture(timeline);
        if mode == ReplayMode::RestartFromOrigin {
            timeline.collapse_to_origin();
        }

        for record in records {
            if let Err(e) = self.run_record(timeline, record) {
                warn!(step = e.step(), error = %e, "Replay failed, rolling back");
                checkpoint.restore(timeline);
                return Err(e.into());
            }
        }

        info!(applied = records.len(), "Replay committed");
        Ok(ReplayReport {
            applied: records.len(),
            mode,
        })
    }

    fn run_record(&self, timeline: &mut Timeline, record: &OperationRecord) -> Result<(), ReplayError> {
        trace!(step = record.step, operation = %record.operation, "replay record");
        let op = self
            .registry
            .get(&record.operation)
            .ok_or_else(|| ReplayError::UnknownOperation {
                name: record.operation.clone(),
                step: record.step,
            })?;

        let params = self
            .resolution
            .decode(&record.parameters, op.schema(), &self.known);

        let image = {
            let current = timeline.current().ok_or_else(|| ReplayError::OperationFailed {
                name: record.operation.clone(),
                step: record.step,
                source: OpsError::Unsupported("no current image".into()),
            })?;
            op.process(current, &params)
                .map_err(|source| ReplayError::OperationFailed {
                    name: record.operation.clone(),
                    step: record.step,
                    source,
                })?
        };

        debug!(step = record.step, image = %image, "Replayed record");
        timeline.commit_step(image, &record.operation, record.parameters.clone());
        Ok(())
    }
}
