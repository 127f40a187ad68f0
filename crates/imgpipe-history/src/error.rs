//! Error types for the pipeline core.
//!
//! - [`ImportError`] - a pipeline document could not be accepted
//! - [`ReplayError`] - a replay stopped at a record and was rolled back
//! - [`PipelineError`] - anything a [`Session`](crate::Session) call can fail with
//! - [`ConfigError`] - session configuration could not be loaded
//!
//! None of these leave session state partially modified.

use crate::manager::SessionId;
use imgpipe_ops::OpsError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for session operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Pipeline document rejected at parse time.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Input is not valid JSON.
    #[error("malformed JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),

    /// Top-level shape or a value type does not match the document format.
    #[error("schema violation at '{field}': {message}")]
    SchemaViolation {
        /// Dotted path of the offending field.
        field: String,
        /// What was wrong with it.
        message: String,
    },

    /// An entry lacks a required field.
    #[error("functions_applied[{index}]: missing field '{field}'")]
    MissingField {
        /// Zero-based entry position.
        index: usize,
        /// Missing field name.
        field: &'static str,
    },
}

impl ImportError {
    pub(crate) fn violation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaViolation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Replay stopped at a record. The session was restored to its state before
/// the replay started.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The record names an operation the registry does not know.
    #[error("step {step}: unknown operation '{name}'")]
    UnknownOperation {
        /// Operation name from the record.
        name: String,
        /// Step number from the record.
        step: u64,
    },

    /// The operation ran and failed.
    #[error("step {step}: operation '{name}' failed: {source}")]
    OperationFailed {
        /// Operation name from the record.
        name: String,
        /// Step number from the record.
        step: u64,
        /// Underlying failure.
        #[source]
        source: OpsError,
    },
}

impl ReplayError {
    /// Step number of the failing record.
    pub fn step(&self) -> u64 {
        match self {
            Self::UnknownOperation { step, .. } | Self::OperationFailed { step, .. } => *step,
        }
    }
}

/// Errors from [`Session`](crate::Session) and
/// [`SessionManager`](crate::SessionManager) calls.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Document could not be parsed.
    #[error(transparent)]
    Import(#[from] ImportError),

    /// Replay was rolled back.
    #[error(transparent)]
    Replay(#[from] ReplayError),

    /// No source image has been loaded.
    #[error("no source image loaded")]
    NoImage,

    /// Operation name is not registered.
    #[error("unknown operation '{0}'")]
    UnknownOperation(String),

    /// Operation failed on the current image.
    #[error("operation '{name}' failed: {source}")]
    Operation {
        /// Operation name.
        name: String,
        /// Underlying failure.
        #[source]
        source: OpsError,
    },

    /// The history cursor moved after the preview was taken.
    #[error("preview is stale: history changed since it was computed")]
    StalePreview,

    /// Session id is not open.
    #[error("unknown session {0}")]
    UnknownSession(SessionId),

    /// Document serialization failed.
    #[error("export error: {0}")]
    Export(#[from] serde_json::Error),
}

/// Configuration loading error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("config file not found: {path}")]
    NotFound {
        /// Path that was tried.
        path: PathBuf,
    },

    /// I/O error reading the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
