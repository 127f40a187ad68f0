//! Error types for imgpipe-core operations.
//!
//! The [`Error`] enum covers failures in image buffer construction and
//! access. Operation and pipeline errors live in their own crates and wrap
//! this one where an image buffer is involved.
//!
//! # Usage
//!
//! ```rust
//! use imgpipe_core::{Error, Result};
//!
//! fn check_channels(channels: u32) -> Result<()> {
//!     if !matches!(channels, 1 | 3 | 4) {
//!         return Err(Error::UnsupportedChannels(channels));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_channels(2).is_err());
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or accessing image buffers.
#[derive(Debug, Error)]
pub enum Error {
    /// Pixel coordinates are outside image bounds.
    #[error("pixel ({x}, {y}) out of bounds for image {width}x{height}")]
    OutOfBounds {
        /// X coordinate that was out of bounds
        x: u32,
        /// Y coordinate that was out of bounds
        y: u32,
        /// Image width
        width: u32,
        /// Image height
        height: u32,
    },

    /// Invalid image dimensions.
    ///
    /// Returned when width or height is zero, or when the sample buffer
    /// length does not match `width * height * channels`.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Reason why dimensions are invalid
        reason: String,
    },

    /// Channel count other than 1 (gray), 3 (RGB) or 4 (RGBA).
    #[error("unsupported channel count: {0}")]
    UnsupportedChannels(u32),

    /// Generic error with custom message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Creates an [`Error::OutOfBounds`] error.
    #[inline]
    pub fn out_of_bounds(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self::OutOfBounds {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::Other`] error.
    #[inline]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
