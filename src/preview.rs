//! Plain-text preview of extracted records
//!
//! Rendered with the display policy: one line per record, arrays collapsed into a
//! single cell, missing values shown as a placeholder. Columns come from the first
//! record only, so this is not a substitute for an export.

use crate::normalize::{format_value, FormatPolicy};
use crate::types::Record;

pub fn render_preview(records: &[Record]) -> String {
    let Some(first) = records.first() else {
        return String::new();
    };
    let columns: Vec<&String> = first.keys().collect();

    let mut table: Vec<Vec<String>> = Vec::with_capacity(records.len() + 1);
    table.push(
        std::iter::once("#".to_string())
            .chain(columns.iter().map(|c| c.replace('_', " ").to_uppercase()))
            .collect(),
    );
    for (i, record) in records.iter().enumerate() {
        table.push(
            std::iter::once(format!("{:02}", i + 1))
                .chain(
                    columns
                        .iter()
                        .map(|c| format_value(record.get(c.as_str()), FormatPolicy::Display)),
                )
                .collect(),
        );
    }

    let widths: Vec<usize> = (0..table[0].len())
        .map(|col| table.iter().map(|row| row[col].chars().count()).max().unwrap_or(0))
        .collect();

    let mut out = String::new();
    for row in &table {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_preview_uses_display_policy() {
        let records: Vec<Record> = vec![
            serde_json::from_value(json!({"item_name": "Widget", "tags": ["red", "blue"]})).unwrap(),
            serde_json::from_value(json!({"item_name": null, "extra": 1})).unwrap(),
        ];
        let preview = render_preview(&records);
        let lines: Vec<&str> = preview.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "#   ITEM NAME  TAGS");
        assert_eq!(lines[1], "01  Widget     red, blue");
        assert_eq!(lines[2], format!("02  —{}—", " ".repeat(10)));
        assert!(!preview.contains("EXTRA"));
    }

    #[test]
    fn test_empty_preview() {
        assert_eq!(render_preview(&[]), "");
    }
}
