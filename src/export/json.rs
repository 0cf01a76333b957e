use crate::error::Result;
use crate::types::Record;

/// Serialize the original records, 2-space indented.
///
/// Unlike the flat exporters this keeps each record's native shape; arrays and
/// nested objects are written as-is, never fanned out into rows.
pub fn to_json(records: &[Record]) -> Result<String> {
    let json = serde_json::to_string_pretty(records)?;
    log::debug!("encoded {} records as {} bytes of JSON", records.len(), json.len());
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_preserves_original_shape() {
        let original = json!([{"title": "Widget", "tags": ["red", "blue"], "price": "9.99"}]);
        let records: Vec<Record> = serde_json::from_value(original.clone()).unwrap();

        let out = to_json(&records).unwrap();
        let parsed: Value = serde_json::from_str(&out).unwrap();

        assert_eq!(parsed, original);
        assert_eq!(out, serde_json::to_string_pretty(&original).unwrap());
        assert!(out.contains("\n  {\n    \"title\": \"Widget\""));
    }

    #[test]
    fn test_key_order_kept() {
        let records: Vec<Record> =
            serde_json::from_str(r#"[{"zeta": 1, "alpha": {"y": 2, "b": 3}}]"#).unwrap();
        let out = to_json(&records).unwrap();

        let zeta = out.find("zeta").unwrap();
        let alpha = out.find("alpha").unwrap();
        assert!(zeta < alpha);
        assert!(out.find("\"y\"").unwrap() < out.find("\"b\"").unwrap());
    }
}
