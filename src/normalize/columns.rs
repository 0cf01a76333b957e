use crate::types::{ColumnSet, Record};
use std::collections::HashSet;

/// Discover the column set of a record collection.
///
/// Field names are taken in first-seen order: records in input order, and within a
/// record in that record's own field order. Every field name appears exactly once.
pub fn discover_columns(records: &[Record]) -> ColumnSet {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut columns = Vec::new();

    for record in records {
        for key in record.keys() {
            if seen.insert(key.as_str()) {
                columns.push(key.clone());
            }
        }
    }

    ColumnSet::new(columns)
}
