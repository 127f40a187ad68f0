//! # imgpipe-ops
//!
//! Operation registry and built-in image operations.
//!
//! The pipeline treats operations as opaque: a name, a declared
//! [`ParamSchema`](imgpipe_core::ParamSchema), and a
//! `process(image, params) -> image` call. This crate provides that
//! boundary ([`Operation`], [`OperationRegistry`]) plus a handful of
//! straightforward pixel loops to drive it.
//!
//! # Modules
//!
//! - [`registry`] - Name lookup, listing order, known enum tables
//! - [`builtin`] - The built-in operations
//! - [`filter`] - Gaussian, box and median smoothing
//! - [`morph`] - Dilation and erosion
//! - [`threshold`] - Fixed-level thresholding
//! - [`geometry`] - Resizing
//! - [`arithmetic`] - Invert and blend
//! - [`enums`] - Enumerated option tables
//! - [`params`] - Typed parameter access with schema defaults
//!
//! # Example
//!
//! ```rust
//! use imgpipe_core::{Image, ParamMap};
//! use imgpipe_ops::OperationRegistry;
//!
//! let registry = OperationRegistry::builtin();
//! let blur = registry.get("Gaussian Blur").unwrap();
//!
//! let image = Image::filled(8, 8, 3, 128).unwrap();
//! let out = blur.process(&image, &ParamMap::new()).unwrap();
//! assert_eq!(out.dimensions(), (8, 8));
//! ```
//!
//! # Features
//!
//! - `parallel` (default) - Row-parallel loops through rayon

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod arithmetic;
pub mod builtin;
pub mod enums;
pub mod filter;
pub mod geometry;
pub mod morph;
pub mod operation;
pub mod parallel;
pub mod params;
pub mod registry;
pub mod threshold;

pub use error::{OpsError, OpsResult};
pub use operation::Operation;
pub use params::ParamReader;
pub use registry::OperationRegistry;
