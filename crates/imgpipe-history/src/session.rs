//! Editing session.
//!
//! A [`Session`] owns one image timeline and drives it from user actions:
//!
//! | Action            | Call                                  |
//! |-------------------|---------------------------------------|
//! | New source image  | [`Session::load_source`]              |
//! | Try an operation  | [`Session::preview`]                  |
//! | Keep the result   | [`Session::accept`]                   |
//! | Both at once      | [`Session::apply`]                    |
//! | Revert / Forward  | [`Session::undo`] / [`Session::redo`] |
//! | Clear the record  | [`Session::clear_ledger`]             |
//! | Save the pipeline | [`Session::export_json`]              |
//! | Load a pipeline   | [`Session::import`]                   |
//!
//! Every fallible call either succeeds completely or leaves the session as
//! it was.
//!
//! # Example
//!
//! ```rust
//! use imgpipe_core::{Image, ParamMap};
//! use imgpipe_history::Session;
//!
//! let mut session = Session::builtin();
//! session.load_source(Image::filled(16, 16, 3, 40).unwrap());
//!
//! session.apply("Gaussian Blur", ParamMap::new()).unwrap();
//! session.apply("Invert", ParamMap::new()).unwrap();
//! session.undo();
//!
//! let doc = session.export();
//! assert_eq!(doc.total_steps, 1);
//! assert_eq!(doc.operations[0].operation, "Gaussian Blur");
//! ```

use crate::codec::{self, EncodedParams};
use crate::config::SessionConfig;
use crate::document::{self, PipelineDocument};
use crate::error::{PipelineError, PipelineResult};
use crate::ledger::OperationRecord;
use crate::replay::{ReplayMode, ReplayReport, Replayer};
use crate::timeline::Timeline;
use imgpipe_core::{Image, ParamMap};
use imgpipe_ops::OperationRegistry;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Result of running an operation without committing it.
#[derive(Debug, Clone)]
pub struct Preview {
    /// Operation name.
    pub operation: String,
    /// Parameters as they will be recorded.
    pub parameters: EncodedParams,
    /// Processed image.
    pub image: Image,
    /// History cursor the preview was computed at.
    pub base_index: Option<usize>,
    /// Processing time.
    pub elapsed: Duration,
    revision: u64,
}

/// One user's editing state.
pub struct Session {
    registry: Arc<OperationRegistry>,
    config: SessionConfig,
    timeline: Timeline,
    revision: u64,
}

impl Session {
    /// Creates a session over `registry`.
    pub fn new(registry: Arc<OperationRegistry>, config: SessionConfig) -> Self {
        Self {
            registry,
            config,
            timeline: Timeline::new(),
            revision: 0,
        }
    }

    /// Session over the built-in operations with default config.
    pub fn builtin() -> Self {
        Self::new(Arc::new(OperationRegistry::builtin()), SessionConfig::default())
    }

    /// Operation registry.
    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    /// Active configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// History and ledger.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Image at the history cursor.
    pub fn current_image(&self) -> Option<&Image> {
        self.timeline.current()
    }

    /// Replaces everything with a fresh origin image.
    pub fn load_source(&mut self, image: Image) {
        self.timeline.load_source(image);
        self.bump();
    }

    /// Runs `name` on the current image without committing.
    ///
    /// Parameters missing from `params` are filled from the schema
    /// defaults, so the recorded entry lists every declared parameter.
    ///
    /// # Errors
    ///
    /// [`PipelineError::NoImage`], [`PipelineError::UnknownOperation`] or
    /// [`PipelineError::Operation`].
    pub fn preview(&self, name: &str, params: ParamMap) -> PipelineResult<Preview> {
        trace!(name, params = params.len(), "Session::preview");
        let current = self.timeline.current().ok_or(PipelineError::NoImage)?;
        let op = self
            .registry
            .get(name)
            .ok_or_else(|| PipelineError::UnknownOperation(name.to_string()))?;

        let mut params = params;
        for (key, value) in op.schema().defaults() {
            params.entry(key).or_insert(value);
        }

        let start = Instant::now();
        let image = op
            .process(current, &params)
            .map_err(|source| PipelineError::Operation {
                name: name.to_string(),
                source,
            })?;
        let elapsed = start.elapsed();

        let ms = elapsed.as_millis();
        if ms > u128::from(self.config.slow_operation_ms) {
            warn!(name, elapsed_ms = ms as u64, "Slow operation");
        } else {
            debug!(name, elapsed_ms = ms as u64, "Processed preview");
        }

        Ok(Preview {
            operation: name.to_string(),
            parameters: codec::encode(&params),
            image,
            base_index: self.timeline.history().index(),
            elapsed,
            revision: self.revision,
        })
    }

    /// Commits a preview as the next step.
    ///
    /// # Errors
    ///
    /// [`PipelineError::StalePreview`] if the history changed since the
    /// preview was computed.
    pub fn accept(&mut self, preview: Preview) -> PipelineResult<&OperationRecord> {
        if preview.revision != self.revision || preview.base_index != self.timeline.history().index() {
            warn!(operation = %preview.operation, "Rejecting stale preview");
            return Err(PipelineError::StalePreview);
        }
        self.bump();
        let record = self
            .timeline
            .commit_step(preview.image, &preview.operation, preview.parameters);
        info!(step = record.step, operation = %record.operation, "Accepted step");
        Ok(record)
    }

    /// Runs `name` and commits the result.
    pub fn apply(&mut self, name: &str, params: ParamMap) -> PipelineResult<&OperationRecord> {
        let preview = self.preview(name, params)?;
        self.accept(preview)
    }

    /// Steps back. Returns the new current image, or `None` at the origin.
    pub fn undo(&mut self) -> Option<&Image> {
        if !self.timeline.history().can_undo() {
            return None;
        }
        self.bump();
        self.timeline.undo()
    }

    /// Steps forward. Returns the new current image, or `None` at the end.
    pub fn redo(&mut self) -> Option<&Image> {
        if !self.timeline.history().can_redo() {
            return None;
        }
        self.bump();
        self.timeline.redo()
    }

    /// Drops every ledger record. Images and undo/redo are unaffected.
    pub fn clear_ledger(&mut self) {
        info!("Clearing operation ledger");
        self.timeline.clear_ledger();
    }

    /// Document of the visible records.
    pub fn export(&self) -> PipelineDocument {
        document::export(self.timeline.ledger())
    }

    /// [`export`](Self::export) serialized per `pretty_export`.
    pub fn export_json(&self) -> PipelineResult<String> {
        Ok(document::to_json(&self.export(), self.config.pretty_export)?)
    }

    /// Parses `bytes` as a pipeline document and replays it.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Import`] for an invalid document (nothing runs),
    /// otherwise as [`replay`](Self::replay).
    pub fn import(&mut self, bytes: &[u8], mode: ReplayMode) -> PipelineResult<ReplayReport> {
        if self.timeline.current().is_none() {
            return Err(PipelineError::NoImage);
        }
        let doc = document::parse(bytes)?;
        self.replay(&doc.operations, mode)
    }

    /// Replays `records`, all or nothing.
    pub fn replay(
        &mut self,
        records: &[OperationRecord],
        mode: ReplayMode,
    ) -> PipelineResult<ReplayReport> {
        let report = Replayer::new(&self.registry, self.config.enum_resolution).replay(
            &mut self.timeline,
            records,
            mode,
        )?;
        self.bump();
        Ok(report)
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
