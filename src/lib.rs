//! # record_export - Flatten and export extracted records
//!
//! Turns a collection of scraped records with uneven shapes into three export
//! artifacts: CSV text, JSON text and a paginated PDF table.
//!
//! ## Modules
//!
//! - **normalize**: column discovery, value formatting and array fan-out
//! - **export**: the CSV/JSON/PDF encoders and the download dispatcher
//! - **preview**: plain-text preview using the display formatting policy
//!
//! ## Quick Start
//!
//! ```rust
//! use record_export::{discover_columns, load_records, normalize, to_csv};
//!
//! # fn main() -> record_export::Result<()> {
//! let records = load_records(r#"[{"title": "Widget", "tags": ["red", "blue"], "price": "9.99"}]"#)?;
//! let columns = discover_columns(&records);
//!
//! // One record, two rows: the `tags` array fans out
//! let rows = normalize(&records, &columns);
//! assert_eq!(rows.len(), 2);
//!
//! let csv = to_csv(&records, &columns)?;
//! assert!(csv.ends_with("\"1\",\"\",\"blue\",\"\""));
//! # Ok(())
//! # }
//! ```

use serde_json::Value;

pub mod error;
pub mod export;
pub mod normalize;
pub mod preview;
pub mod types;

pub use error::{ExportError, Result};
pub use export::{deliver, to_csv, to_json, to_table, DownloadSink, ExportDispatcher, FileSink, MemorySink};
pub use normalize::{discover_columns, format_value, normalize, FormatPolicy};
pub use preview::render_preview;
pub use types::{Artifact, ColumnSet, ExportConfig, ExportFormat, NormalizedRow, Record, TableStyle};

/// Parse a record collection from JSON text.
///
/// Accepts a bare array of objects or a scrape response envelope whose `data`
/// field holds that array.
pub fn load_records(input: &str) -> Result<Vec<Record>> {
    let value: Value = serde_json::from_str(input)?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut envelope) => match envelope.remove("data") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(ExportError::InvalidInput(
                    "expected an array of records or an object with a \"data\" array".to_string(),
                ))
            }
        },
        _ => {
            return Err(ExportError::InvalidInput(
                "expected an array of records".to_string(),
            ))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(record) => Ok(record),
            other => Err(ExportError::InvalidRecord {
                position: i + 1,
                found: json_type_name(&other),
            }),
        })
        .collect()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_bare_array() {
        let records = load_records(r#"[{"b": 1, "a": 2}, {"c": null}]"#).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].keys().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn test_load_response_envelope() {
        let input = r#"{"data": [{"title": "Widget"}], "meta": {"model": "x", "duration": 1.2, "timestamp": 0}}"#;
        let records = load_records(input).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["title"], "Widget");
    }

    #[test]
    fn test_load_rejects_non_objects() {
        let err = load_records(r#"[{"a": 1}, "oops"]"#).unwrap_err();
        assert!(matches!(err, ExportError::InvalidRecord { position: 2, found: "string" }));

        assert!(matches!(load_records("42"), Err(ExportError::InvalidInput(_))));
        assert!(matches!(load_records(r#"{"items": []}"#), Err(ExportError::InvalidInput(_))));
        assert!(matches!(load_records("not json"), Err(ExportError::Json(_))));
    }
}
