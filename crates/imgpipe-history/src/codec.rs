//! Parameter codec.
//!
//! Converts in-memory [`RuntimeValue`]s to the JSON-safe [`EncodedValue`]
//! form recorded in the ledger, and back.
//!
//! # Encoding
//!
//! | Runtime value         | Encoded as                    |
//! |-----------------------|-------------------------------|
//! | `Int`, `Bool`, `Text` | as-is                         |
//! | `Float` (finite)      | as-is                         |
//! | `Float` (NaN, inf)    | `Text` rendering              |
//! | `Enum`                | member name as `Text`         |
//! | `Tuple`               | `List`, element-wise          |
//! | `Image`               | `Text` rendering              |
//!
//! # Decoding
//!
//! Encoded strings carry no type tag, so an enum member name and a plain
//! string look the same. [`decode`] resolves strings by trial matching
//! against each known enum table in order; the first table with a member
//! of that name wins. [`decode_with_schema`] uses the operation's declared
//! parameter types first and only trial-matches parameters the schema does
//! not type as an enum. Decoding never fails: an unresolved string stays a
//! string and the operation reports a type mismatch if it cares.

use imgpipe_core::{EnumType, ParamMap, ParamSchema, RuntimeValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::trace;

/// JSON-safe parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EncodedValue {
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Finite float.
    Float(f64),
    /// String, enum member name, or rendering of a non-serializable value.
    Text(String),
    /// Ordered list.
    List(Vec<EncodedValue>),
}

/// Encoded parameters keyed by name.
pub type EncodedParams = BTreeMap<String, EncodedValue>;

impl fmt::Display for EncodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v:?}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// How encoded strings are turned back into enum values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumResolution {
    /// Use the operation's declared parameter types, trial-match the rest.
    #[default]
    Schema,
    /// Trial-match every string against all known enum types.
    TrialMatch,
}

impl EnumResolution {
    /// Decodes `encoded` for an operation with `schema`.
    pub fn decode(
        self,
        encoded: &EncodedParams,
        schema: &ParamSchema,
        known: &[&'static EnumType],
    ) -> ParamMap {
        match self {
            Self::Schema => decode_with_schema(encoded, schema, known),
            Self::TrialMatch => decode(encoded, known),
        }
    }
}

/// Encodes a single value.
pub fn encode_value(value: &RuntimeValue) -> EncodedValue {
    match value {
        RuntimeValue::Int(v) => EncodedValue::Int(*v),
        RuntimeValue::Bool(v) => EncodedValue::Bool(*v),
        RuntimeValue::Text(v) => EncodedValue::Text(v.clone()),
        RuntimeValue::Float(v) if v.is_finite() => EncodedValue::Float(*v),
        RuntimeValue::Enum(e) => EncodedValue::Text(e.name().to_string()),
        RuntimeValue::Tuple(items) => EncodedValue::List(items.iter().map(encode_value).collect()),
        other => EncodedValue::Text(other.to_string()),
    }
}

/// Encodes a parameter map.
pub fn encode(params: &ParamMap) -> EncodedParams {
    trace!(count = params.len(), "codec::encode");
    params
        .iter()
        .map(|(k, v)| (k.clone(), encode_value(v)))
        .collect()
}

/// Decodes a single value by trial matching strings against `known`.
pub fn decode_value(value: &EncodedValue, known: &[&'static EnumType]) -> RuntimeValue {
    match value {
        EncodedValue::Bool(v) => RuntimeValue::Bool(*v),
        EncodedValue::Int(v) => RuntimeValue::Int(*v),
        EncodedValue::Float(v) => RuntimeValue::Float(*v),
        EncodedValue::Text(s) => known
            .iter()
            .find_map(|ty| ty.member(s))
            .map(RuntimeValue::Enum)
            .unwrap_or_else(|| RuntimeValue::Text(s.clone())),
        EncodedValue::List(items) => {
            RuntimeValue::Tuple(items.iter().map(|v| decode_value(v, known)).collect())
        }
    }
}

/// Decodes a parameter map by trial matching strings against `known`, in
/// order.
pub fn decode(encoded: &EncodedParams, known: &[&'static EnumType]) -> ParamMap {
    trace!(count = encoded.len(), known = known.len(), "codec::decode");
    encoded
        .iter()
        .map(|(k, v)| (k.clone(), decode_value(v, known)))
        .collect()
}

/// Decodes a parameter map, resolving enum-typed parameters against the
/// type `schema` declares for them.
///
/// A string that is not a member of the declared type stays a string.
pub fn decode_with_schema(
    encoded: &EncodedParams,
    schema: &ParamSchema,
    known: &[&'static EnumType],
) -> ParamMap {
    trace!(count = encoded.len(), "codec::decode_with_schema");
    encoded
        .iter()
        .map(|(k, v)| {
            let decoded = match schema.enum_type_for(k) {
                Some(ty) => decode_value(v, &[ty]),
                None => decode_value(v, known),
            };
            (k.clone(), decoded)
        })
        .collect()
}
