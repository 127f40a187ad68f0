//! Typed access to operation parameters.
//!
//! [`ParamReader`] pulls values out of a [`ParamMap`] with the conversions
//! an operation expects, falling back to the schema default when a
//! parameter is absent (imported pipelines may omit parameters added to an
//! operation later). Wrong types surface as [`OpsError::TypeMismatch`];
//! values outside a declared range or option list surface as
//! [`OpsError::InvalidParameter`].

use crate::{OpsError, OpsResult};
use imgpipe_core::{EnumType, EnumValue, Image, ParamMap, ParamSchema, ParameterSpec, RuntimeValue};
use std::borrow::Cow;

/// Reads typed parameters for one operation call.
pub struct ParamReader<'a> {
    op: &'static str,
    params: &'a ParamMap,
    schema: &'a ParamSchema,
}

impl<'a> ParamReader<'a> {
    /// Creates a reader for `op` over the supplied values and schema.
    pub fn new(op: &'static str, params: &'a ParamMap, schema: &'a ParamSchema) -> Self {
        Self { op, params, schema }
    }

    /// Raw value: supplied, else schema default.
    pub fn value(&self, key: &str) -> OpsResult<Cow<'a, RuntimeValue>> {
        if let Some(v) = self.params.get(key) {
            return Ok(Cow::Borrowed(v));
        }
        self.schema
            .get(key)
            .and_then(|spec| spec.default_value())
            .map(Cow::Owned)
            .ok_or_else(|| OpsError::MissingParameter {
                op: self.op,
                param: key.to_string(),
            })
    }

    /// Integer parameter, checked against the declared range.
    pub fn int(&self, key: &str) -> OpsResult<i64> {
        let v = self.value(key)?;
        let n = v.as_i64().ok_or_else(|| self.mismatch(key, "int", &v))?;
        self.check_range(key, n as f64)?;
        Ok(n)
    }

    /// Float parameter, checked against the declared range. Integers are
    /// accepted.
    pub fn float(&self, key: &str) -> OpsResult<f64> {
        let v = self.value(key)?;
        let x = v.as_f64().ok_or_else(|| self.mismatch(key, "float", &v))?;
        self.check_range(key, x)?;
        Ok(x)
    }

    /// Boolean parameter.
    pub fn boolean(&self, key: &str) -> OpsResult<bool> {
        let v = self.value(key)?;
        v.as_bool().ok_or_else(|| self.mismatch(key, "bool", &v))
    }

    /// Enumerated parameter of type `ty`.
    ///
    /// Accepts a member of `ty`, a member name as text, or the numeric
    /// constant.
    pub fn enumeration(&self, key: &str, ty: &EnumType) -> OpsResult<EnumValue> {
        let v = self.value(key)?;
        let resolved = match &*v {
            RuntimeValue::Enum(e) if e.is_of(ty) => Some(*e),
            RuntimeValue::Text(name) => ty.member(name),
            RuntimeValue::Int(n) => ty.by_value(*n),
            _ => None,
        };
        resolved.ok_or_else(|| self.mismatch(key, ty.name(), &v))
    }

    /// Two-component integer parameter such as a kernel size. A single
    /// integer `n` reads as `(n, n)`.
    ///
    /// Under a `Choice` spec the pair must be one of the options; under an
    /// integer range both components must lie in it.
    pub fn pair(&self, key: &str) -> OpsResult<(i64, i64)> {
        let v = self.value(key)?;
        let (a, b) = match v.as_i64() {
            Some(n) => (n, n),
            None => match v.as_tuple() {
                Some([a, b]) => match (a.as_i64(), b.as_i64()) {
                    (Some(a), Some(b)) => (a, b),
                    _ => return Err(self.mismatch(key, "pair of ints", &v)),
                },
                _ => return Err(self.mismatch(key, "pair of ints", &v)),
            },
        };

        if let Some(ParameterSpec::Choice { options }) = self.schema.get(key) {
            let listed = options.iter().any(|opt| match opt.as_tuple() {
                Some([x, y]) => x.as_i64() == Some(a) && y.as_i64() == Some(b),
                _ => opt.as_i64().is_some_and(|n| n == a && n == b),
            });
            if !listed {
                return Err(OpsError::InvalidParameter(format!(
                    "{}: '{key}' = ({a}, {b}) is not one of the listed options",
                    self.op
                )));
            }
        }
        self.check_range(key, a as f64)?;
        self.check_range(key, b as f64)?;
        Ok((a, b))
    }

    /// Second-image parameter.
    pub fn image(&self, key: &str) -> OpsResult<&'a Image> {
        match self.params.get(key) {
            Some(RuntimeValue::Image(img)) => Ok(img),
            Some(other) => Err(self.mismatch(key, "image", other)),
            None => Err(OpsError::MissingParameter {
                op: self.op,
                param: key.to_string(),
            }),
        }
    }

    fn check_range(&self, key: &str, x: f64) -> OpsResult<()> {
        let (min, max) = match self.schema.get(key) {
            Some(ParameterSpec::IntRange { min, max, .. }) => (*min as f64, *max as f64),
            Some(ParameterSpec::FloatRange { min, max, .. }) => (*min, *max),
            _ => return Ok(()),
        };
        if x.is_nan() || x < min || x > max {
            return Err(OpsError::InvalidParameter(format!(
                "{}: '{key}' = {x} is outside [{min}, {max}]",
                self.op
            )));
        }
        Ok(())
    }

    fn mismatch(&self, key: &str, expected: &'static str, got: &RuntimeValue) -> OpsError {
        OpsError::TypeMismatch {
            op: self.op,
            param: key.to_string(),
            expected,
            got: format!("{} {}", got.kind(), got),
        }
    }
}
