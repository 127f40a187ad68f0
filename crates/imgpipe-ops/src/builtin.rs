//! Built-in operations.
//!
//! Each operation is a unit of work the registry can look up by name:
//!
//! | Name          | Parameters                                   |
//! |---------------|----------------------------------------------|
//! | Gaussian Blur | `ksize`, `sigmaX`, `sigmaY`, `borderType`    |
//! | Median Blur   | `ksize`                                      |
//! | Box Blur      | `ksize` (pair), `borderType`                 |
//! | Threshold     | `thresh`, `maxval`, `thresh_type`            |
//! | Dilate        | `ksize`, `iterations`, `shape`               |
//! | Erode         | `ksize`, `iterations`, `shape`               |
//! | Resize        | `fx`, `fy`, `interpolation`                  |
//! | Invert        | none                                         |
//! | Blend         | `overlay` (second image), `alpha`            |

use crate::enums::{
    BORDER_TYPE, BorderMode, INTERPOLATION, Interpolation, MORPH_SHAPE, MorphShape,
    THRESHOLD_TYPE, ThresholdKind,
};
use crate::morph::{self, StructuringElement};
use crate::params::ParamReader;
use crate::registry::OperationRegistry;
use crate::{OpsError, OpsResult, Operation, arithmetic, filter, geometry, threshold};
use imgpipe_core::{Image, ParamMap, ParamSchema, ParameterSpec, RuntimeValue};

/// Registers every built-in operation, in listing order.
pub fn register_all(registry: &mut OperationRegistry) {
    registry
        .register(GaussianBlur::new())
        .register(MedianBlur::new())
        .register(BoxBlur::new())
        .register(Threshold::new())
        .register(Morphology::dilate())
        .register(Morphology::erode())
        .register(Resize::new())
        .register(Invert::new())
        .register(Blend::new());
}

fn reader<'a>(op: &'a impl Operation, params: &'a ParamMap) -> ParamReader<'a> {
    ParamReader::new(op.name(), params, op.schema())
}

/// Separable Gaussian smoothing.
pub struct GaussianBlur {
    schema: ParamSchema,
}

impl GaussianBlur {
    /// Creates the operation with its default schema.
    pub fn new() -> Self {
        Self {
            schema: ParamSchema::new()
                .with("ksize", ParameterSpec::int(1, 31, 5, 2))
                .with("sigmaX", ParameterSpec::float(0.1, 10.0, 1.0, 0.1))
                .with("sigmaY", ParameterSpec::float(0.0, 10.0, 0.0, 0.1))
                .with("borderType", ParameterSpec::Enum { ty: &BORDER_TYPE }),
        }
    }
}

impl Default for GaussianBlur {
    fn default() -> Self {
        Self::new()
    }
}

impl Operation for GaussianBlur {
    fn name(&self) -> &'static str {
        "Gaussian Blur"
    }

    fn description(&self) -> &'static str {
        "Smooth with a Gaussian kernel"
    }

    fn schema(&self) -> &ParamSchema {
        &self.schema
    }

    fn process(&self, image: &Image, params: &ParamMap) -> OpsResult<Image> {
        let p = reader(self, params);
        let border = BorderMode::from_enum(p.enumeration("borderType", &BORDER_TYPE)?)?;
        filter::gaussian_blur(
            image,
            p.int("ksize")?,
            p.float("sigmaX")?,
            p.float("sigmaY")?,
            border,
        )
    }
}

/// Median filter.
pub struct MedianBlur {
    schema: ParamSchema,
}

impl MedianBlur {
    /// Creates the operation with its default schema.
    pub fn new() -> Self {
        Self {
            schema: ParamSchema::new().with("ksize", ParameterSpec::int(3, 31, 5, 2)),
        }
    }
}

impl Default for MedianBlur {
    fn default() -> Self {
        Self::new()
    }
}

impl Operation for MedianBlur {
    fn name(&self) -> &'static str {
        "Median Blur"
    }

    fn description(&self) -> &'static str {
        "Replace each pixel with its neighborhood median"
    }

    fn schema(&self) -> &ParamSchema {
        &self.schema
    }

    fn process(&self, image: &Image, params: &ParamMap) -> OpsResult<Image> {
        filter::median_blur(image, reader(self, params).int("ksize")?)
    }
}

/// Normalized box filter.
pub struct BoxBlur {
    schema: ParamSchema,
}

impl BoxBlur {
    /// Creates the operation with its default schema.
    pub fn new() -> Self {
        let sizes = [3_i64, 5, 7, 9, 11, 15]
            .into_iter()
            .map(|k| RuntimeValue::from((k, k)))
            .collect();
        Self {
            schema: ParamSchema::new()
                .with("ksize", ParameterSpec::Choice { options: sizes })
                .with("borderType", ParameterSpec::Enum { ty: &BORDER_TYPE }),
        }
    }
}

impl Default for BoxBlur {
    fn default() -> Self {
        Self::new()
    }
}

impl Operation for BoxBlur {
    fn name(&self) -> &'static str {
        "Box Blur"
    }

    fn description(&self) -> &'static str {
        "Average over a rectangular window"
    }

    fn schema(&self) -> &ParamSchema {
        &self.schema
    }

    fn process(&self, image: &Image, params: &ParamMap) -> OpsResult<Image> {
        let p = reader(self, params);
        let (kw, kh) = p.pair("ksize")?;
        let border = BorderMode::from_enum(p.enumeration("borderType", &BORDER_TYPE)?)?;
        filter::box_blur(image, kw, kh, border)
    }
}

/// Fixed-level threshold.
pub struct Threshold {
    schema: ParamSchema,
}

impl Threshold {
    /// Creates the operation with its default schema.
    pub fn new() -> Self {
        Self {
            schema: ParamSchema::new()
                .with("thresh", ParameterSpec::int(0, 255, 127, 1))
                .with("maxval", ParameterSpec::int(0, 255, 255, 1))
                .with("thresh_type", ParameterSpec::Enum { ty: &THRESHOLD_TYPE }),
        }
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::new()
    }
}

impl Operation for Threshold {
    fn name(&self) -> &'static str {
        "Threshold"
    }

    fn description(&self) -> &'static str {
        "Binarize or clip luma against a level"
    }

    fn schema(&self) -> &ParamSchema {
        &self.schema
    }

    fn process(&self, image: &Image, params: &ParamMap) -> OpsResult<Image> {
        let p = reader(self, params);
        let kind = ThresholdKind::from_enum(p.enumeration("thresh_type", &THRESHOLD_TYPE)?)?;
        threshold::threshold(image, p.float("thresh")?, p.float("maxval")?, kind)
    }
}

#[derive(Clone, Copy)]
enum MorphOp {
    Dilate,
    Erode,
}

/// Dilation or erosion with a shaped structuring element.
pub struct Morphology {
    op: MorphOp,
    schema: ParamSchema,
}

impl Morphology {
    fn with_op(op: MorphOp) -> Self {
        Self {
            op,
            schema: ParamSchema::new()
                .with("ksize", ParameterSpec::int(1, 31, 5, 1))
                .with("iterations", ParameterSpec::int(1, 10, 1, 1))
                .with("shape", ParameterSpec::Enum { ty: &MORPH_SHAPE }),
        }
    }

    /// Local maximum.
    pub fn dilate() -> Self {
        Self::with_op(MorphOp::Dilate)
    }

    /// Local minimum.
    pub fn erode() -> Self {
        Self::with_op(MorphOp::Erode)
    }
}

impl Operation for Morphology {
    fn name(&self) -> &'static str {
        match self.op {
            MorphOp::Dilate => "Dilate",
            MorphOp::Erode => "Erode",
        }
    }

    fn description(&self) -> &'static str {
        match self.op {
            MorphOp::Dilate => "Grow bright regions",
            MorphOp::Erode => "Shrink bright regions",
        }
    }

    fn schema(&self) -> &ParamSchema {
        &self.schema
    }

    fn process(&self, image: &Image, params: &ParamMap) -> OpsResult<Image> {
        let p = reader(self, params);
        let ksize = p.int("ksize")?;
        let size = usize::try_from(ksize)
            .ok()
            .filter(|&s| s > 0)
            .ok_or_else(|| OpsError::InvalidParameter(format!("ksize must be positive, got {ksize}")))?;
        let shape = MorphShape::from_enum(p.enumeration("shape", &MORPH_SHAPE)?)?;
        let element = StructuringElement::new(shape, size)?;
        let iterations = p.int("iterations")?;
        match self.op {
            MorphOp::Dilate => morph::dilate(image, &element, iterations),
            MorphOp::Erode => morph::erode(image, &element, iterations),
        }
    }
}

/// Rescale by independent horizontal and vertical factors.
pub struct Resize {
    schema: ParamSchema,
}

impl Resize {
    /// Creates the operation with its default schema.
    pub fn new() -> Self {
        Self {
            schema: ParamSchema::new()
                .with("fx", ParameterSpec::float(0.1, 10.0, 1.0, 0.1))
                .with("fy", ParameterSpec::float(0.1, 10.0, 1.0, 0.1))
                .with("interpolation", ParameterSpec::Enum { ty: &INTERPOLATION }),
        }
    }
}

impl Default for Resize {
    fn default() -> Self {
        Self::new()
    }
}

impl Operation for Resize {
    fn name(&self) -> &'static str {
        "Resize"
    }

    fn description(&self) -> &'static str {
        "Scale the image"
    }

    fn schema(&self) -> &ParamSchema {
        &self.schema
    }

    fn process(&self, image: &Image, params: &ParamMap) -> OpsResult<Image> {
        let p = reader(self, params);
        let interpolation =
            Interpolation::from_enum(p.enumeration("interpolation", &INTERPOLATION)?)?;
        geometry::resize(image, p.float("fx")?, p.float("fy")?, interpolation)
    }
}

/// Photographic negative.
pub struct Invert {
    schema: ParamSchema,
}

impl Invert {
    /// Creates the operation.
    pub fn new() -> Self {
        Self {
            schema: ParamSchema::new(),
        }
    }
}

impl Default for Invert {
    fn default() -> Self {
        Self::new()
    }
}

impl Operation for Invert {
    fn name(&self) -> &'static str {
        "Invert"
    }

    fn description(&self) -> &'static str {
        "Negate color channels"
    }

    fn schema(&self) -> &ParamSchema {
        &self.schema
    }

    fn process(&self, image: &Image, _params: &ParamMap) -> OpsResult<Image> {
        Ok(arithmetic::invert(image))
    }
}

/// Mix with a second image of the same size.
pub struct Blend {
    schema: ParamSchema,
}

impl Blend {
    /// Creates the operation with its default schema.
    pub fn new() -> Self {
        Self {
            schema: ParamSchema::new()
                .with("overlay", ParameterSpec::SecondImage)
                .with("alpha", ParameterSpec::float(0.0, 1.0, 0.5, 0.05)),
        }
    }
}

impl Default for Blend {
    fn default() -> Self {
        Self::new()
    }
}

impl Operation for Blend {
    fn name(&self) -> &'static str {
        "Blend"
    }

    fn description(&self) -> &'static str {
        "Weighted mix with a second image"
    }

    fn schema(&self) -> &ParamSchema {
        &self.schema
    }

    fn process(&self, image: &Image, params: &ParamMap) -> OpsResult<Image> {
        let p = reader(self, params);
        arithmetic::blend(image, p.image("overlay")?, p.float("alpha")?)
    }
}
