//! Record normalization - discover a stable column set and flatten records into rows
//!
//! Records coming out of an extraction run rarely share one shape: fields go
//! missing, hold arrays, or hold nested objects. Everything the flat exporters
//! (CSV and the tabular document) consume goes through this module first.

pub mod columns;
pub mod format;
pub mod rows;

pub use columns::discover_columns;
pub use format::{format_value, FormatPolicy, DISPLAY_PLACEHOLDER};
pub use rows::{normalize, sub_row_count};
