//! Parameter schemas.
//!
//! Every operation declares a [`ParamSchema`]: an ordered list of named
//! [`ParameterSpec`]s. A UI builds its widgets from it, the CLI fills
//! defaults from it, and the pipeline codec uses its enum declarations to
//! resolve symbolic names without guessing.

use crate::{EnumType, ParamMap, RuntimeValue};

/// Declared shape of one parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterSpec {
    /// Integer slider `(min, max, default, step)`.
    IntRange {
        /// Lower bound
        min: i64,
        /// Upper bound
        max: i64,
        /// Default value
        default: i64,
        /// Slider step
        step: i64,
    },
    /// Float slider `(min, max, default, step)`.
    FloatRange {
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
        /// Default value
        default: f64,
        /// Slider step
        step: f64,
    },
    /// Checkbox.
    Bool {
        /// Default state
        default: bool,
    },
    /// Plain option list; the first option is the default.
    Choice {
        /// Selectable values
        options: Vec<RuntimeValue>,
    },
    /// Enumerated option list; the first member is the default.
    Enum {
        /// Enum table the options come from
        ty: &'static EnumType,
    },
    /// The operation needs a second image.
    SecondImage,
}

impl ParameterSpec {
    /// Integer range shorthand.
    pub const fn int(min: i64, max: i64, default: i64, step: i64) -> Self {
        Self::IntRange {
            min,
            max,
            default,
            step,
        }
    }

    /// Float range shorthand.
    pub const fn float(min: f64, max: f64, default: f64, step: f64) -> Self {
        Self::FloatRange {
            min,
            max,
            default,
            step,
        }
    }

    /// Default value, if the parameter has one. `SecondImage` has none.
    pub fn default_value(&self) -> Option<RuntimeValue> {
        match self {
            Self::IntRange { default, .. } => Some(RuntimeValue::Int(*default)),
            Self::FloatRange { default, .. } => Some(RuntimeValue::Float(*default)),
            Self::Bool { default } => Some(RuntimeValue::Bool(*default)),
            Self::Choice { options } => options.first().cloned(),
            Self::Enum { ty } => ty.first().map(RuntimeValue::Enum),
            Self::SecondImage => None,
        }
    }

    /// Enum table for enumerated parameters.
    pub fn enum_type(&self) -> Option<&'static EnumType> {
        match self {
            Self::Enum { ty } => Some(*ty),
            _ => None,
        }
    }

    /// Short label for listings.
    pub fn describe(&self) -> String {
        match self {
            Self::IntRange {
                min,
                max,
                default,
                step,
            } => format!("int {min}..={max} (default {default}, step {step})"),
            Self::FloatRange {
                min,
                max,
                default,
                step,
            } => format!("float {min}..={max} (default {default}, step {step})"),
            Self::Bool { default } => format!("bool (default {default})"),
            Self::Choice { options } => {
                let opts: Vec<String> = options.iter().map(|o| o.to_string()).collect();
                format!("one of [{}]", opts.join(", "))
            }
            Self::Enum { ty } => {
                let names: Vec<&str> = ty.members().map(|m| m.name()).collect();
                format!("{} [{}]", ty.name(), names.join(", "))
            }
            Self::SecondImage => "second image".to_string(),
        }
    }
}

/// Ordered set of parameter declarations for one operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSchema {
    entries: Vec<(String, ParameterSpec)>,
}

impl ParamSchema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter (builder style). A repeated name replaces the
    /// earlier declaration in place.
    pub fn with(mut self, name: impl Into<String>, spec: ParameterSpec) -> Self {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = spec,
            None => self.entries.push((name, spec)),
        }
        self
    }

    /// Looks up a parameter declaration.
    pub fn get(&self, name: &str) -> Option<&ParameterSpec> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, spec)| spec)
    }

    /// Declared enum type for `name`, if the parameter is enumerated.
    pub fn enum_type_for(&self, name: &str) -> Option<&'static EnumType> {
        self.get(name).and_then(ParameterSpec::enum_type)
    }

    /// Enum types referenced by this schema, in declaration order.
    pub fn enum_types(&self) -> impl Iterator<Item = &'static EnumType> + '_ {
        self.entries.iter().filter_map(|(_, spec)| spec.enum_type())
    }

    /// Iterates `(name, spec)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterSpec)> {
        self.entries.iter().map(|(n, s)| (n.as_str(), s))
    }

    /// Default values for every parameter that has one.
    pub fn defaults(&self) -> ParamMap {
        self.entries
            .iter()
            .filter_map(|(name, spec)| spec.default_value().map(|v| (name.clone(), v)))
            .collect()
    }

    /// Number of declared parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the operation takes no parameters.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
