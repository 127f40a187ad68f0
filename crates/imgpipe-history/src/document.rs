//! Pipeline export and import.
//!
//! A pipeline document is the visible part of the ledger in a stable JSON
//! layout:
//!
//! ```json
//! {
//!   "processing_pipeline": {
//!     "total_steps": 2,
//!     "current_step": 2,
//!     "functions_applied": [
//!       {"step": 1, "function_name": "Gaussian Blur",
//!        "parameters": {"ksize": 5, "borderType": "BORDER_DEFAULT"},
//!        "timestamp": "2024-05-01T10:00:00Z"}
//!     ]
//!   },
//!   "export_timestamp": "2024-05-01T10:00:05Z"
//! }
//! ```
//!
//! An export with no visible operations carries a `"note"` inside
//! `processing_pipeline`: [`EMPTY_HISTORY_NOTE`] when nothing has been
//! applied, [`CLEARED_LEDGER_NOTE`] after the ledger was cleared.
//!
//! [`parse`] validates the whole document before accepting any of it.
//! Unknown fields are ignored; missing optional fields are defaulted.

use crate::codec::{EncodedParams, EncodedValue};
use crate::error::ImportError;
use crate::ledger::{Ledger, OperationRecord};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::{debug, trace};

/// Note attached to an export taken before any operation was applied.
pub const EMPTY_HISTORY_NOTE: &str = "no operations applied";

/// Note attached to an export taken after the ledger was cleared.
pub const CLEARED_LEDGER_NOTE: &str = "operation ledger cleared";

/// Parsed or exported pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineDocument {
    /// Number of operations in the document.
    pub total_steps: usize,
    /// Ledger position the export was taken at (1-based, 0 for none).
    pub current_step: usize,
    /// Operations in application order.
    pub operations: Vec<OperationRecord>,
    /// When the document was produced.
    pub exported_at: DateTime<Utc>,
    /// Free-form note.
    pub note: Option<String>,
}

impl PipelineDocument {
    /// Returns `true` for the sentinel document, whether nothing was
    /// applied or the ledger was cleared.
    pub fn is_empty_history(&self) -> bool {
        self.operations.is_empty()
            && matches!(
                self.note.as_deref(),
                Some(EMPTY_HISTORY_NOTE | CLEARED_LEDGER_NOTE)
            )
    }

    /// Returns `true` for the sentinel exported after a cleared ledger.
    pub fn was_cleared(&self) -> bool {
        self.operations.is_empty() && self.note.as_deref() == Some(CLEARED_LEDGER_NOTE)
    }
}

#[derive(Serialize)]
struct WireDocument<'a> {
    processing_pipeline: WirePipeline<'a>,
    export_timestamp: &'a DateTime<Utc>,
}

#[derive(Serialize)]
struct WirePipeline<'a> {
    total_steps: usize,
    current_step: usize,
    functions_applied: &'a [OperationRecord],
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<&'a str>,
}

impl Serialize for PipelineDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireDocument {
            processing_pipeline: WirePipeline {
                total_steps: self.total_steps,
                current_step: self.current_step,
                functions_applied: &self.operations,
                note: self.note.as_deref(),
            },
            export_timestamp: &self.exported_at,
        }
        .serialize(serializer)
    }
}

/// Builds a document from the ledger's visible records.
pub fn export(ledger: &Ledger) -> PipelineDocument {
    let operations = ledger.visible_records().to_vec();
    let note = match ledger.index() {
        None if ledger.was_cleared() => Some(CLEARED_LEDGER_NOTE.to_string()),
        None => Some(EMPTY_HISTORY_NOTE.to_string()),
        Some(_) => None,
    };
    debug!(steps = operations.len(), "Exporting pipeline");
    PipelineDocument {
        total_steps: operations.len(),
        current_step: ledger.index().map_or(0, |i| i + 1),
        operations,
        exported_at: Utc::now(),
        note,
    }
}

/// Serializes a document.
pub fn to_json(doc: &PipelineDocument, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(doc)
    } else {
        serde_json::to_string(doc)
    }
}

/// Parses and validates a document.
///
/// # Errors
///
/// - [`ImportError::MalformedJson`] for invalid JSON
/// - [`ImportError::SchemaViolation`] for a wrong shape or value type
/// - [`ImportError::MissingField`] for an entry without `function_name` or
///   `parameters`
pub fn parse(bytes: &[u8]) -> Result<PipelineDocument, ImportError> {
    trace!(len = bytes.len(), "document::parse");
    let root: Value = serde_json::from_slice(bytes).map_err(ImportError::MalformedJson)?;
    let root = root
        .as_object()
        .ok_or_else(|| ImportError::violation("$", "expected an object"))?;

    let pipeline = root
        .get("processing_pipeline")
        .ok_or_else(|| ImportError::violation("processing_pipeline", "missing"))?
        .as_object()
        .ok_or_else(|| ImportError::violation("processing_pipeline", "expected an object"))?;

    let entries = pipeline
        .get("functions_applied")
        .ok_or_else(|| ImportError::violation("processing_pipeline.functions_applied", "missing"))?
        .as_array()
        .ok_or_else(|| {
            ImportError::violation("processing_pipeline.functions_applied", "expected an array")
        })?;

    let now = Utc::now();
    let operations = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| parse_entry(i, entry, now))
        .collect::<Result<Vec<_>, _>>()?;

    let count = operations.len();
    let total_steps = optional_count(pipeline, "total_steps")?.unwrap_or(count);
    let current_step = optional_count(pipeline, "current_step")?.unwrap_or(count);
    let note = match pipeline.get("note") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            return Err(ImportError::violation(
                "processing_pipeline.note",
                "expected a string",
            ));
        }
    };
    let exported_at = optional_timestamp(root, "export_timestamp", "export_timestamp")?.unwrap_or(now);

    debug!(steps = count, total_steps, current_step, "Parsed pipeline");
    Ok(PipelineDocument {
        total_steps,
        current_step,
        operations,
        exported_at,
        note,
    })
}

/// Parses RFC 3339, or naive ISO-8601 read as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn parse_entry(index: usize, entry: &Value, now: DateTime<Utc>) -> Result<OperationRecord, ImportError> {
    let path = format!("functions_applied[{index}]");
    let obj = entry
        .as_object()
        .ok_or_else(|| ImportError::violation(&path, "expected an object"))?;

    let operation = match obj.get("function_name") {
        None => {
            return Err(ImportError::MissingField {
                index,
                field: "function_name",
            });
        }
        Some(Value::String(s)) => s.clone(),
        Some(_) => {
            return Err(ImportError::violation(
                format!("{path}.function_name"),
                "expected a string",
            ));
        }
    };

    let parameters = match obj.get("parameters") {
        None => {
            return Err(ImportError::MissingField {
                index,
                field: "parameters",
            });
        }
        Some(Value::Object(map)) => encoded_params(map, &format!("{path}.parameters"))?,
        Some(_) => {
            return Err(ImportError::violation(
                format!("{path}.parameters"),
                "expected an object",
            ));
        }
    };

    let step = match obj.get("step") {
        None | Some(Value::Null) => index as u64 + 1,
        Some(v) => v.as_u64().filter(|&s| s >= 1).ok_or_else(|| {
            ImportError::violation(format!("{path}.step"), "expected a positive integer")
        })?,
    };

    let timestamp = optional_timestamp(obj, "timestamp", &format!("{path}.timestamp"))?.unwrap_or(now);

    Ok(OperationRecord {
        step,
        operation,
        parameters,
        timestamp,
    })
}

fn encoded_params(map: &Map<String, Value>, path: &str) -> Result<EncodedParams, ImportError> {
    map.iter()
        .map(|(k, v)| encoded_value(v, &format!("{path}.{k}")).map(|ev| (k.clone(), ev)))
        .collect()
}

fn encoded_value(value: &Value, path: &str) -> Result<EncodedValue, ImportError> {
    match value {
        Value::Bool(b) => Ok(EncodedValue::Bool(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(EncodedValue::Int(i)),
            None => n
                .as_f64()
                .map(EncodedValue::Float)
                .ok_or_else(|| ImportError::violation(path, "unrepresentable number")),
        },
        Value::String(s) => Ok(EncodedValue::Text(s.clone())),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| encoded_value(v, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(EncodedValue::List),
        Value::Null => Err(ImportError::violation(path, "null is not a parameter value")),
        Value::Object(_) => Err(ImportError::violation(path, "objects are not parameter values")),
    }
}

fn optional_count(pipeline: &Map<String, Value>, key: &str) -> Result<Option<usize>, ImportError> {
    match pipeline.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| {
                ImportError::violation(
                    format!("processing_pipeline.{key}"),
                    "expected a non-negative integer",
                )
            }),
    }
}

fn optional_timestamp(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Option<DateTime<Utc>>, ImportError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => parse_timestamp(s)
            .map(Some)
            .ok_or_else(|| ImportError::violation(path, format!("unparseable timestamp '{s}'"))),
        Some(_) => Err(ImportError::violation(path, "expected an ISO-8601 string")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ledger(names: &[&str]) -> Ledger {
        let mut l = Ledger::new();
        for name in names {
            let mut p = EncodedParams::new();
            p.insert("k".into(), EncodedValue::Int(3));
            l.record(name, p);
        }
        l
    }

    #[test]
    fn test_export_visible_prefix() {
        let mut l = ledger(&["A", "B", "C"]);
        l.sync_to_history_cursor(Some(2));
        let doc = export(&l);
        assert_eq!(doc.total_steps, 2);
        assert_eq!(doc.current_step, 2);
        assert_eq!(doc.operations.len(), 2);
        assert!(doc.note.is_none());
    }

    #[test]
    fn test_export_empty_is_sentinel() {
        let doc = export(&Ledger::new());
        assert_eq!(doc.total_steps, 0);
        assert_eq!(doc.current_step, 0);
        assert!(doc.is_empty_history());

        let json: Value = serde_json::from_str(&to_json(&doc, false).unwrap()).unwrap();
        assert_eq!(json["processing_pipeline"]["note"], EMPTY_HISTORY_NOTE);
        assert_eq!(json["processing_pipeline"]["functions_applied"], Value::Array(vec![]));
        assert!(!doc.was_cleared());
    }

    #[test]
    fn test_export_after_clear_has_own_note() {
        let mut l = ledger(&["A"]);
        l.clear();
        let doc = export(&l);
        assert!(doc.is_empty_history());
        assert!(doc.was_cleared());

        let json = to_json(&doc, false).unwrap();
        let parsed = parse(json.as_bytes()).unwrap();
        assert_eq!(parsed.note.as_deref(), Some(CLEARED_LEDGER_NOTE));
        assert!(parsed.was_cleared());
    }

    #[test]
    fn test_wire_layout() {
        let doc = export(&ledger(&["Invert"]));
        let json: Value = serde_json::from_str(&to_json(&doc, true).unwrap()).unwrap();
        let pipeline = &json["processing_pipeline"];
        assert_eq!(pipeline["total_steps"], 1);
        assert_eq!(pipeline["current_step"], 1);
        assert!(pipeline.get("note").is_none());
        let entry = &pipeline["functions_applied"][0];
        assert_eq!(entry["step"], 1);
        assert_eq!(entry["function_name"], "Invert");
        assert_eq!(entry["parameters"]["k"], 3);
        assert!(json["export_timestamp"].is_string());
    }

    #[test]
    fn test_parse_exported() {
        let doc = export(&ledger(&["A", "B"]));
        let parsed = parse(to_json(&doc, false).unwrap().as_bytes()).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_parse_defaults() {
        let json = br#"{"processing_pipeline": {"functions_applied": [
            {"function_name": "A", "parameters": {"x": 1.5, "k": [3, 3], "m": "FAST"}},
            {"function_name": "B", "parameters": {}}
        ]}}"#;
        let doc = parse(json).unwrap();
        assert_eq!(doc.total_steps, 2);
        assert_eq!(doc.current_step, 2);
        assert_eq!(doc.operations[0].step, 1);
        assert_eq!(doc.operations[1].step, 2);
        assert_eq!(doc.operations[0].parameters["x"], EncodedValue::Float(1.5));
        assert_eq!(
            doc.operations[0].parameters["k"],
            EncodedValue::List(vec![EncodedValue::Int(3), EncodedValue::Int(3)])
        );
        assert!(doc.note.is_none());
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(parse(b"{not json"), Err(ImportError::MalformedJson(_))));
    }

    #[test]
    fn test_parse_shape_violations() {
        let cases: [&[u8]; 6] = [
            b"[]",
            b"{}",
            br#"{"processing_pipeline": []}"#,
            br#"{"processing_pipeline": {"functions_applied": {}}}"#,
            br#"{"processing_pipeline": {"functions_applied": [5]}}"#,
            br#"{"processing_pipeline": {"total_steps": "two", "functions_applied": []}}"#,
        ];
        for case in cases {
            assert!(
                matches!(parse(case), Err(ImportError::SchemaViolation { .. })),
                "{}",
                String::from_utf8_lossy(case)
            );
        }
    }

    #[test]
    fn test_parse_bad_values() {
        let null_param = br#"{"processing_pipeline": {"functions_applied": [
            {"function_name": "A", "parameters": {"x": null}}]}}"#;
        let err = parse(null_param).unwrap_err();
        match err {
            ImportError::SchemaViolation { field, .. } => {
                assert_eq!(field, "functions_applied[0].parameters.x")
            }
            other => panic!("unexpected {other:?}"),
        }

        let bad_time = br#"{"processing_pipeline": {"functions_applied": [
            {"function_name": "A", "parameters": {}, "timestamp": "yesterday"}]}}"#;
        assert!(matches!(parse(bad_time), Err(ImportError::SchemaViolation { .. })));
    }

    #[test]
    fn test_parse_missing_fields() {
        let no_name = br#"{"processing_pipeline": {"functions_applied": [
            {"function_name": "A", "parameters": {}},
            {"parameters": {}}]}}"#;
        assert!(matches!(
            parse(no_name),
            Err(ImportError::MissingField {
                index: 1,
                field: "function_name"
            })
        ));

        let no_params = br#"{"processing_pipeline": {"functions_applied": [
            {"function_name": "A"}]}}"#;
        assert!(matches!(
            parse(no_params),
            Err(ImportError::MissingField {
                index: 0,
                field: "parameters"
            })
        ));
    }

    #[test]
    fn test_parse_ignores_unknown_fields() {
        let json = br#"{"version": 9, "processing_pipeline": {"extra": true, "functions_applied": [
            {"function_name": "A", "parameters": {}, "comment": "hi"}]}}"#;
        assert_eq!(parse(json).unwrap().operations.len(), 1);
    }

    #[test]
    fn test_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-05-01T10:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01T12:00:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01T10:00:00"), Some(expected));
        assert!(parse_timestamp("2024-05-01T10:00:00.250000").is_some());
        assert!(parse_timestamp("May 1st").is_none());
    }
}
