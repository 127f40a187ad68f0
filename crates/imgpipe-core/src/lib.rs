//! # imgpipe-core
//!
//! Core types shared by the imgpipe crates.
//!
//! - [`Image`] - 8-bit image snapshot with copy-on-write sharing
//! - [`RuntimeValue`], [`EnumType`], [`EnumValue`] - typed operation parameters
//! - [`ParamSchema`], [`ParameterSpec`] - declared parameter shapes
//! - [`Error`] - buffer construction and access errors
//!
//! ## Crate Structure
//!
//! This crate has no internal dependencies. Everything else builds on it:
//!
//! ```text
//! imgpipe-core (this crate)
//!    ^
//!    |
//!    +-- imgpipe-ops (operation registry, built-in operations)
//!    +-- imgpipe-history (history, ledger, export/import, replay)
//!    +-- imgpipe-cli
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod image;
pub mod schema;
pub mod value;

pub use error::{Error, Result};
pub use image::{Image, LUMA_WEIGHTS};
pub use schema::{ParamSchema, ParameterSpec};
pub use value::{EnumType, EnumValue, ParamMap, RuntimeValue};

/// Prelude module for convenient imports.
///
/// ```
/// use imgpipe_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::image::Image;
    pub use crate::schema::{ParamSchema, ParameterSpec};
    pub use crate::value::{EnumType, EnumValue, ParamMap, RuntimeValue};
}
