use crate::error::{ExportError, Result};
use crate::normalize::normalize;
use crate::types::{ColumnSet, Record};
use csv::{QuoteStyle, Terminator, WriterBuilder};

/// Byte-order mark so spreadsheet importers detect UTF-8
const BOM: &str = "\u{FEFF}";
const LINE_END: &str = "\r\n";

/// Encode records as CSV text.
///
/// Header is `#` plus every column (underscores to spaces, upper-cased), body is one
/// line per normalized row. Every cell is quoted with embedded quotes doubled, lines
/// are CRLF-separated with no trailing terminator, and the text starts with a BOM.
pub fn to_csv(records: &[Record], columns: &ColumnSet) -> Result<String> {
    let rows = normalize(records, columns);

    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .double_quote(true)
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());

    wtr.write_record(columns.headers())?;
    for row in &rows {
        wtr.write_record(row.to_export_cells())?;
    }

    let bytes = wtr.into_inner().map_err(|e| ExportError::Io(e.into_error()))?;
    let body = String::from_utf8(bytes)
        .map_err(|e| ExportError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;

    let mut out = String::with_capacity(BOM.len() + body.len());
    out.push_str(BOM);
    out.push_str(body.strip_suffix(LINE_END).unwrap_or(&body));

    log::debug!("encoded {} records as {} CSV rows", records.len(), rows.len());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::discover_columns;
    use serde_json::json;

    fn records(values: Vec<serde_json::Value>) -> Vec<Record> {
        values
            .into_iter()
            .map(|v| serde_json::from_value(v).unwrap())
            .collect()
    }

    #[test]
    fn test_widget_csv_exact() {
        let input = records(vec![json!({"title": "Widget", "tags": ["red", "blue"], "price": "9.99"})]);
        let columns = discover_columns(&input);
        let csv = to_csv(&input, &columns).unwrap();

        assert_eq!(
            csv,
            "\u{FEFF}\"#\",\"TITLE\",\"TAGS\",\"PRICE\"\r\n\
             \"1\",\"Widget\",\"red\",\"9.99\"\r\n\
             \"1\",\"\",\"blue\",\"\""
        );
    }

    #[test]
    fn test_quotes_doubled_and_header_transformed() {
        let input = records(vec![json!({"product_name": "The \"Best\" Lamp", "note": "a,b"})]);
        let columns = discover_columns(&input);
        let csv = to_csv(&input, &columns).unwrap();

        let lines: Vec<&str> = csv.trim_start_matches(BOM).split("\r\n").collect();
        assert_eq!(lines[0], "\"#\",\"PRODUCT NAME\",\"NOTE\"");
        assert_eq!(lines[1], "\"1\",\"The \"\"Best\"\" Lamp\",\"a,b\"");
    }

    #[test]
    fn test_line_counts_match_rows() {
        let input = records(vec![
            json!({"a": [1, 2, 3], "b": "x"}),
            json!({"c": true}),
            json!({"a": [], "d": {"k": 1}}),
        ]);
        let columns = discover_columns(&input);
        let csv = to_csv(&input, &columns).unwrap();
        let total_rows = normalize(&input, &columns).len();

        let lines: Vec<&str> = csv.trim_start_matches(BOM).split("\r\n").collect();
        assert_eq!(lines.len(), total_rows + 1);
        assert_eq!(lines[0].split(',').count(), columns.len() + 1);
        assert!(!csv.ends_with("\r\n"));
    }

    #[test]
    fn test_repeatable_output() {
        let input = records(vec![json!({"a": [1, 2], "b": {"x": null}})]);
        let columns = discover_columns(&input);
        assert_eq!(to_csv(&input, &columns).unwrap(), to_csv(&input, &columns).unwrap());
    }
}
