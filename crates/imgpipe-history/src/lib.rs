//! # imgpipe-history
//!
//! Undo/redo history, operation ledger, pipeline export/import and
//! transactional replay.
//!
//! Every committed operation produces two things at once: a new image
//! snapshot in the [`HistoryStore`] and an [`OperationRecord`] in the
//! [`Ledger`]. The pair lives in a [`Timeline`], owned by a [`Session`].
//! The visible part of the ledger exports to a JSON
//! [`PipelineDocument`] which can be parsed back and replayed, all steps
//! or none.
//!
//! ```text
//!               commit_step
//!   Session ──> Timeline ──┬──> HistoryStore<Image>   (snapshots + cursor)
//!      │                   └──> Ledger                (records + cursor)
//!      │
//!      ├── export ──> PipelineDocument ──> JSON
//!      └── import <── parse <─────────────  JSON
//!                      └──> Replayer ──> Checkpoint (rollback)
//! ```
//!
//! # Modules
//!
//! - [`history`] - Snapshot sequence with fork-truncating commits
//! - [`ledger`] - Operation records aligned with the history cursor
//! - [`codec`] - Runtime values to JSON-safe values and back
//! - [`document`] - Wire format, export and validating parse
//! - [`replay`] - All-or-nothing replay
//! - [`timeline`] - History and ledger mutated together
//! - [`session`] - User-facing session calls
//! - [`manager`] - Sessions keyed by id
//! - [`config`] - YAML-loadable session settings

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod codec;
pub mod config;
pub mod document;
mod error;
pub mod history;
pub mod ledger;
pub mod manager;
pub mod replay;
pub mod session;
pub mod timeline;

pub use codec::{EncodedParams, EncodedValue, EnumResolution};
pub use config::SessionConfig;
pub use document::PipelineDocument;
pub use error::{ConfigError, ImportError, PipelineError, PipelineResult, ReplayError};
pub use history::HistoryStore;
pub use ledger::{Ledger, OperationRecord};
pub use manager::{SessionId, SessionManager};
pub use replay::{Checkpoint, ReplayMode, ReplayReport, Replayer};
pub use session::{Preview, Session};
pub use timeline::Timeline;
