//! Error types for image operations.

use thiserror::Error;

/// Error type for image operations.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A required parameter was not supplied and has no default.
    #[error("{op}: missing parameter '{param}'")]
    MissingParameter {
        /// Operation name
        op: &'static str,
        /// Parameter name
        param: String,
    },

    /// A parameter has the wrong type.
    #[error("{op}: parameter '{param}' expects {expected}, got {got}")]
    TypeMismatch {
        /// Operation name
        op: &'static str,
        /// Parameter name
        param: String,
        /// Expected kind
        expected: &'static str,
        /// Supplied value, rendered
        got: String,
    },

    /// Images have incompatible sizes.
    #[error("size mismatch: {0}")]
    SizeMismatch(String),

    /// Operation not supported for this input.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Image buffer error.
    #[error(transparent)]
    Image(#[from] imgpipe_core::Error),
}

/// Result type for image operations.
pub type OpsResult<T> = Result<T, OpsError>;
