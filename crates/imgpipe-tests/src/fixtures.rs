//! Small operation set and images shared by the integration tests.

use imgpipe_core::{EnumType, Image, ParamMap, ParamSchema, ParameterSpec, RuntimeValue};
use imgpipe_history::{Session, SessionConfig};
use imgpipe_ops::enums::{BorderMode, MorphShape, ThresholdKind};
use imgpipe_ops::morph::{self, StructuringElement};
use imgpipe_ops::{filter, threshold, Operation, OperationRegistry, OpsError, OpsResult, ParamReader};
use std::sync::Arc;

/// Edge handling for [`Blur`]. Listed before [`TINT_MODE`] in the registry.
pub static EDGE_MODE: EnumType = EnumType::new("EdgeMode", &[("CLAMP", 1), ("SHARED", 0)]);

/// Tint selector. Shares the member name `SHARED` with [`EDGE_MODE`].
pub static TINT_MODE: EnumType = EnumType::new("TintMode", &[("WARM", 1), ("SHARED", 9)]);

pub struct Blur(ParamSchema);

impl Blur {
    pub fn new() -> Self {
        Self(
            ParamSchema::new()
                .with("size", ParameterSpec::int(1, 31, 3, 2))
                .with("edge", ParameterSpec::Enum { ty: &EDGE_MODE }),
        )
    }
}

impl Operation for Blur {
    fn name(&self) -> &'static str {
        "Blur"
    }
    fn schema(&self) -> &ParamSchema {
        &self.0
    }
    fn process(&self, image: &Image, params: &ParamMap) -> OpsResult<Image> {
        let p = ParamReader::new(self.name(), params, &self.0);
        let border = match p.enumeration("edge", &EDGE_MODE)?.name() {
            "CLAMP" => BorderMode::Replicate,
            _ => BorderMode::Constant,
        };
        filter::gaussian_blur(image, p.int("size")?, 0.0, 0.0, border)
    }
}

pub struct Threshold(ParamSchema);

impl Threshold {
    pub fn new() -> Self {
        Self(ParamSchema::new().with("t", ParameterSpec::int(0, 255, 127, 1)))
    }
}

impl Operation for Threshold {
    fn name(&self) -> &'static str {
        "Threshold"
    }
    fn schema(&self) -> &ParamSchema {
        &self.0
    }
    fn process(&self, image: &Image, params: &ParamMap) -> OpsResult<Image> {
        let t = ParamReader::new(self.name(), params, &self.0).float("t")?;
        threshold::threshold(image, t, 255.0, ThresholdKind::Binary)
    }
}

pub struct Erode(ParamSchema);

impl Erode {
    pub fn new() -> Self {
        Self(ParamSchema::new().with("iter", ParameterSpec::int(1, 10, 1, 1)))
    }
}

impl Operation for Erode {
    fn name(&self) -> &'static str {
        "Erode"
    }
    fn schema(&self) -> &ParamSchema {
        &self.0
    }
    fn process(&self, image: &Image, params: &ParamMap) -> OpsResult<Image> {
        let iter = ParamReader::new(self.name(), params, &self.0).int("iter")?;
        morph::erode(image, &StructuringElement::new(MorphShape::Rect, 3)?, iter)
    }
}

/// Fills the image with `10 * mode`.
pub struct Tint(ParamSchema);

impl Tint {
    pub fn new() -> Self {
        Self(ParamSchema::new().with("mode", ParameterSpec::Enum { ty: &TINT_MODE }))
    }
}

impl Operation for Tint {
    fn name(&self) -> &'static str {
        "Tint"
    }
    fn schema(&self) -> &ParamSchema {
        &self.0
    }
    fn process(&self, image: &Image, params: &ParamMap) -> OpsResult<Image> {
        let mode = ParamReader::new(self.name(), params, &self.0).enumeration("mode", &TINT_MODE)?;
        Ok(Image::filled(
            image.width(),
            image.height(),
            image.channels(),
            (mode.value() * 10) as u8,
        )?)
    }
}

/// Always fails.
pub struct Explode(ParamSchema);

impl Operation for Explode {
    fn name(&self) -> &'static str {
        "Explode"
    }
    fn schema(&self) -> &ParamSchema {
        &self.0
    }
    fn process(&self, _image: &Image, _params: &ParamMap) -> OpsResult<Image> {
        Err(OpsError::Unsupported("explode".into()))
    }
}

pub fn registry() -> Arc<OperationRegistry> {
    let mut registry = OperationRegistry::new();
    registry
        .register(Blur::new())
        .register(Threshold::new())
        .register(Erode::new())
        .register(Tint::new())
        .register(Explode(ParamSchema::new()));
    Arc::new(registry)
}

pub fn origin() -> Image {
    Image::from_fn(24, 16, 3, |x, y| {
        vec![(x * 10) as u8, (y * 15) as u8, ((x * y) % 256) as u8]
    })
    .unwrap()
}

pub fn session() -> Session {
    session_with(SessionConfig::default())
}

pub fn session_with(config: SessionConfig) -> Session {
    let mut s = Session::new(registry(), config);
    s.load_source(origin());
    s
}

pub fn params(entries: &[(&str, RuntimeValue)]) -> ParamMap {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// Builtin-backed session for end-to-end runs.
pub fn builtin_session() -> Session {
    let mut s = Session::new(Arc::new(OperationRegistry::builtin()), SessionConfig::default());
    s.load_source(origin());
    s
}
