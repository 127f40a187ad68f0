//! The operation capability consumed by the pipeline.

use crate::OpsResult;
use imgpipe_core::{Image, ParamMap, ParamSchema};

/// A named image transform with a declared parameter schema.
///
/// Implementations must not touch the input image; they return a new one.
/// Missing parameters fall back to schema defaults (see
/// [`ParamReader`](crate::params::ParamReader)). Any failure, including
/// out-of-range or mistyped parameters, is reported as an error rather than
/// a panic.
///
/// # Example
///
/// ```rust
/// use imgpipe_core::{Image, ParamMap, ParamSchema};
/// use imgpipe_ops::{Operation, OpsResult};
///
/// struct Identity(ParamSchema);
///
/// impl Operation for Identity {
///     fn name(&self) -> &'static str { "Identity" }
///     fn schema(&self) -> &ParamSchema { &self.0 }
///     fn process(&self, image: &Image, _params: &ParamMap) -> OpsResult<Image> {
///         Ok(image.clone())
///     }
/// }
///
/// let op = Identity(ParamSchema::new());
/// let img = Image::new(2, 2, 3).unwrap();
/// assert_eq!(op.process(&img, &ParamMap::new()).unwrap(), img);
/// ```
pub trait Operation: Send + Sync {
    /// Human-readable operation name, unique within a registry.
    fn name(&self) -> &'static str;

    /// One-line description for listings.
    fn description(&self) -> &'static str {
        ""
    }

    /// Declared parameters.
    fn schema(&self) -> &ParamSchema;

    /// Runs the transform.
    fn process(&self, image: &Image, params: &ParamMap) -> OpsResult<Image>;
}
