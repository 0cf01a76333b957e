use crate::normalize::format::{format_value, FormatPolicy};
use crate::types::{ColumnSet, NormalizedRow, Record};
use serde_json::Value;

/// Expand every record into one or more flat rows.
///
/// A record whose longest array field has `m` elements yields `max(1, m)` rows, all
/// tagged with the record's 1-based position. Array cells take element `i` on
/// sub-row `i` (empty once the array runs out); every other cell appears only on the
/// first sub-row.
pub fn normalize(records: &[Record], columns: &ColumnSet) -> Vec<NormalizedRow> {
    let mut rows = Vec::with_capacity(records.len());
    for (position, record) in records.iter().enumerate() {
        expand_record(record, position + 1, columns, &mut rows);
    }
    rows
}

/// Number of rows a record fans out into
pub fn sub_row_count(record: &Record, columns: &ColumnSet) -> usize {
    columns
        .iter()
        .filter_map(|col| match record.get(col) {
            Some(Value::Array(items)) => Some(items.len()),
            _ => None,
        })
        .fold(1, usize::max)
}

fn expand_record(record: &Record, index: usize, columns: &ColumnSet, rows: &mut Vec<NormalizedRow>) {
    let count = sub_row_count(record, columns);

    for sub_row in 0..count {
        let cells = columns
            .iter()
            .map(|col| match record.get(col) {
                Some(Value::Array(items)) => items
                    .get(sub_row)
                    .map(|item| format_value(Some(item), FormatPolicy::Export))
                    .unwrap_or_default(),
                scalar if sub_row == 0 => format_value(scalar, FormatPolicy::Export),
                _ => String::new(),
            })
            .collect();

        rows.push(NormalizedRow { index, cells });
    }
}
