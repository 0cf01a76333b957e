//! Value-to-string formatting policies
//!
//! Exports and the on-screen preview disagree on how to render missing values and
//! arrays, so the policy is chosen explicitly at every call site.

use serde_json::{Number, Value};

/// Placeholder shown by the preview for a missing or null value
pub const DISPLAY_PLACEHOLDER: &str = "—";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatPolicy {
    /// Used by every exporter: null is empty, arrays are fanned out before formatting
    Export,
    /// Used by the preview table: null is a placeholder, arrays collapse into one cell
    Display,
}

/// Format a possibly-absent field value under `policy`
pub fn format_value(value: Option<&Value>, policy: FormatPolicy) -> String {
    match (value, policy) {
        (None | Some(Value::Null), FormatPolicy::Export) => String::new(),
        (None | Some(Value::Null), FormatPolicy::Display) => DISPLAY_PLACEHOLDER.to_string(),
        (Some(value), policy) => format_present(value, policy),
    }
}

fn format_present(value: &Value, policy: FormatPolicy) -> String {
    match value {
        Value::Null => format_value(None, policy),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(n),
        Value::String(s) => s.clone(),
        // Compact JSON; key order follows the input
        Value::Object(_) => value.to_string(),
        Value::Array(items) => {
            // The row normalizer destructures top-level arrays, so under the export
            // policy this only sees arrays nested inside an array element.
            let separator = match policy {
                FormatPolicy::Export => ",",
                FormatPolicy::Display => ", ",
            };
            items
                .iter()
                .map(|item| format_value(Some(item), FormatPolicy::Export))
                .collect::<Vec<_>>()
                .join(separator)
        }
    }
}

/// Integral floats print without a fraction, so `12.0` reads as `12`
fn format_number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => {
            if f == 0.0 {
                "0".to_string()
            } else {
                format!("{:.0}", f)
            }
        }
        _ => n.to_string(),
    }
}
