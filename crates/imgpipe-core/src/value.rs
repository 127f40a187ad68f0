//! Runtime parameter values.
//!
//! Operations receive their parameters as a [`ParamMap`] of
//! [`RuntimeValue`]s. Enumerated options are modelled by [`EnumType`]
//! (a named, static table of members) and [`EnumValue`] (one member of a
//! table), so a value carries both its numeric constant and its symbolic
//! name.
//!
//! ```rust
//! use imgpipe_core::{EnumType, RuntimeValue};
//!
//! static SHAPE: EnumType = EnumType::new("Shape", &[("RECT", 0), ("CROSS", 1)]);
//!
//! let cross = SHAPE.member("CROSS").unwrap();
//! assert_eq!(cross.value(), 1);
//! assert_eq!(RuntimeValue::from(cross).to_string(), "Shape.CROSS");
//! ```

use crate::Image;
use std::collections::BTreeMap;
use std::fmt;

/// Named parameter values passed to an operation.
pub type ParamMap = BTreeMap<String, RuntimeValue>;

/// A static table of enumerated constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumType {
    name: &'static str,
    members: &'static [(&'static str, i64)],
}

impl EnumType {
    /// Creates an enum table. Member names should be unique within a table.
    pub const fn new(name: &'static str, members: &'static [(&'static str, i64)]) -> Self {
        Self { name, members }
    }

    /// Type name (e.g. `"BorderType"`).
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Iterates members in declaration order.
    pub fn members(&self) -> impl Iterator<Item = EnumValue> + '_ {
        self.members.iter().map(|&(name, value)| EnumValue {
            type_name: self.name,
            name,
            value,
        })
    }

    /// Looks a member up by its symbolic name (exact match).
    pub fn member(&self, name: &str) -> Option<EnumValue> {
        self.members().find(|m| m.name == name)
    }

    /// Looks a member up by its numeric constant. The first declared member
    /// wins when several share a constant.
    pub fn by_value(&self, value: i64) -> Option<EnumValue> {
        self.members().find(|m| m.value == value)
    }

    /// First declared member, used as the default option.
    pub fn first(&self) -> Option<EnumValue> {
        self.members().next()
    }

    /// Number of members.
    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if the table has no members.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// One member of an [`EnumType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumValue {
    type_name: &'static str,
    name: &'static str,
    value: i64,
}

impl EnumValue {
    /// Name of the owning enum type.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Symbolic member name (e.g. `"THRESH_BINARY"`).
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Numeric constant.
    #[inline]
    pub fn value(&self) -> i64 {
        self.value
    }

    /// Returns `true` if this member belongs to `ty`.
    #[inline]
    pub fn is_of(&self, ty: &EnumType) -> bool {
        self.type_name == ty.name
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.type_name, self.name)
    }
}

/// A typed parameter value as seen by an operation.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeValue {
    /// Integer value (slider steps, iterations, kernel sizes).
    Int(i64),
    /// Floating point value (sigmas, scale factors).
    Float(f64),
    /// Boolean flag.
    Bool(bool),
    /// Free text.
    Text(String),
    /// Enumerated constant.
    Enum(EnumValue),
    /// Composite value such as a `(width, height)` grid size.
    Tuple(Vec<RuntimeValue>),
    /// A second input image (template, blend layer).
    Image(Image),
}

impl RuntimeValue {
    /// Short name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Text(_) => "text",
            Self::Enum(_) => "enum",
            Self::Tuple(_) => "tuple",
            Self::Image(_) => "image",
        }
    }

    /// Integer view. Integral floats are accepted.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Int(v) => Some(v),
            Self::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(v as i64),
            _ => None,
        }
    }

    /// Float view. Integers widen.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Int(v) => Some(v as f64),
            Self::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Boolean view.
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// Text view.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Enum view.
    pub fn as_enum(&self) -> Option<EnumValue> {
        match *self {
            Self::Enum(v) => Some(v),
            _ => None,
        }
    }

    /// Tuple view.
    pub fn as_tuple(&self) -> Option<&[RuntimeValue]> {
        match self {
            Self::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Image view.
    pub fn as_image(&self) -> Option<&Image> {
        match self {
            Self::Image(img) => Some(img),
            _ => None,
        }
    }
}

impl fmt::Display for RuntimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::Enum(e) => write!(f, "{e}"),
            Self::Tuple(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
            Self::Image(img) => write!(f, "{img}"),
        }
    }
}

impl From<i64> for RuntimeValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for RuntimeValue {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<u32> for RuntimeValue {
    fn from(v: u32) -> Self {
        Self::Int(v.into())
    }
}

impl From<f64> for RuntimeValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<f32> for RuntimeValue {
    fn from(v: f32) -> Self {
        Self::Float(v.into())
    }
}

impl From<bool> for RuntimeValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for RuntimeValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for RuntimeValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<EnumValue> for RuntimeValue {
    fn from(v: EnumValue) -> Self {
        Self::Enum(v)
    }
}

impl From<Image> for RuntimeValue {
    fn from(v: Image) -> Self {
        Self::Image(v)
    }
}

impl<A: Into<RuntimeValue>, B: Into<RuntimeValue>> From<(A, B)> for RuntimeValue {
    fn from((a, b): (A, B)) -> Self {
        Self::Tuple(vec![a.into(), b.into()])
    }
}
