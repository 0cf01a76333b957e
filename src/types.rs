use crate::error::{ExportError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One extracted item: field name to value, in the order the fields were produced
pub type Record = Map<String, Value>;

/// Name of the synthetic index column prepended to every flat export
pub const INDEX_COLUMN: &str = "#";

/// Ordered, deduplicated field names discovered across a record collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSet(Vec<String>);

impl ColumnSet {
    pub fn new(columns: Vec<String>) -> Self {
        ColumnSet(columns)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|c| c == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|c| c == name)
    }

    /// Export header: `#` followed by every column, underscores as spaces, upper-cased
    pub fn headers(&self) -> Vec<String> {
        std::iter::once(INDEX_COLUMN)
            .chain(self.iter())
            .map(header_label)
            .collect()
    }

    /// Refuse a column set that would shadow the index column
    pub fn check_reserved(&self) -> Result<()> {
        if self.contains(INDEX_COLUMN) {
            return Err(ExportError::ReservedColumn);
        }
        Ok(())
    }
}

/// Header token transform shared by the CSV and tabular encoders
pub fn header_label(name: &str) -> String {
    name.replace('_', " ").to_uppercase()
}

/// A flattened, string-only view of one sub-row of a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRow {
    /// 1-based position of the source record, shared by all of its sub-rows
    pub index: usize,

    /// Formatted cells, aligned with the `ColumnSet` the row was built from
    pub cells: Vec<String>,
}

impl NormalizedRow {
    /// Look up a cell by column name; `#` yields the record index
    pub fn get(&self, columns: &ColumnSet, name: &str) -> Option<String> {
        if name == INDEX_COLUMN {
            return Some(self.index.to_string());
        }
        columns
            .position(name)
            .and_then(|idx| self.cells.get(idx))
            .cloned()
    }

    /// The row as it appears in an export body: index first, then every cell
    pub fn to_export_cells(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.cells.len() + 1);
        out.push(self.index.to_string());
        out.extend(self.cells.iter().cloned());
        out
    }
}

/// The three export artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Csv,
    Json,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Csv, ExportFormat::Json, ExportFormat::Pdf];

    /// Fixed output file name; exports are never user-named
    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Csv => "extraction_results.csv",
            ExportFormat::Json => "extraction_results.json",
            ExportFormat::Pdf => "extraction_results.pdf",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv;charset=utf-8",
            ExportFormat::Json => "application/json",
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

/// An encoded export ready to hand to a download sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub content: Vec<u8>,
    pub file_name: &'static str,
    pub mime_type: &'static str,
}

impl Artifact {
    pub fn new(format: ExportFormat, content: Vec<u8>) -> Self {
        Artifact {
            content,
            file_name: format.file_name(),
            mime_type: format.mime_type(),
        }
    }
}

/// RGB fill/stroke colour, 0-255 per channel
pub type Rgb = [u8; 3];

/// Layout parameters for the tabular document. Lengths are millimetres, font sizes points.
#[derive(Debug, Clone)]
pub struct TableStyle {
    pub page_width: f32,
    pub page_height: f32,

    pub title_font_size: f32,
    pub title_color: Rgb,
    pub meta_font_size: f32,
    pub meta_color: Rgb,

    /// Left edge and baselines of the title and metadata lines on the first page
    pub title_x: f32,
    pub title_y: f32,
    pub meta_y: f32,

    pub font_size: f32,
    pub cell_padding: f32,
    pub line_spacing: f32,

    /// Width of the narrow, centred `#` column
    pub index_column_width: f32,

    pub head_fill: Rgb,
    pub head_text: Rgb,
    pub body_text: Rgb,
    pub alternate_fill: Rgb,
    pub grid_color: Rgb,
    pub grid_line_width: f32,

    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_bottom: f32,

    /// Top of the table on the first page, below title and metadata
    pub start_y: f32,
    /// Top of the table on continuation pages
    pub margin_top: f32,
}

impl Default for TableStyle {
    fn default() -> Self {
        TableStyle {
            // A4 landscape
            page_width: 297.0,
            page_height: 210.0,
            title_font_size: 18.0,
            title_color: [37, 99, 235],
            meta_font_size: 9.0,
            meta_color: [100, 100, 100],
            title_x: 14.0,
            title_y: 15.0,
            meta_y: 22.0,
            font_size: 7.0,
            cell_padding: 3.0,
            line_spacing: 1.15,
            index_column_width: 10.0,
            head_fill: [37, 99, 235],
            head_text: [255, 255, 255],
            body_text: [80, 80, 80],
            alternate_fill: [248, 250, 252],
            grid_color: [200, 200, 200],
            grid_line_width: 0.1,
            margin_left: 10.0,
            margin_right: 10.0,
            margin_bottom: 10.0,
            start_y: 28.0,
            margin_top: 30.0,
        }
    }
}

/// Configuration for an export session
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Title line of the tabular document
    pub title: String,

    pub table: TableStyle,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            title: String::from("ScrapingAgent Pro - Intelligence Report"),
            table: TableStyle::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_prepend_index_and_transform() {
        let columns = ColumnSet::new(vec!["product_name".into(), "price".into()]);
        assert_eq!(columns.headers(), vec!["#", "PRODUCT NAME", "PRICE"]);
    }

    #[test]
    fn test_reserved_column_rejected() {
        let columns = ColumnSet::new(vec!["title".into(), "#".into()]);
        assert!(matches!(columns.check_reserved(), Err(ExportError::ReservedColumn)));
        assert!(ColumnSet::new(vec!["title".into()]).check_reserved().is_ok());
    }

    #[test]
    fn test_row_lookup_by_name() {
        let columns = ColumnSet::new(vec!["a".into(), "b".into()]);
        let row = NormalizedRow { index: 4, cells: vec!["x".into(), "".into()] };

        assert_eq!(row.get(&columns, "#").as_deref(), Some("4"));
        assert_eq!(row.get(&columns, "a").as_deref(), Some("x"));
        assert_eq!(row.get(&columns, "b").as_deref(), Some(""));
        assert_eq!(row.get(&columns, "missing"), None);
        assert_eq!(row.to_export_cells(), vec!["4", "x", ""]);
    }

    #[test]
    fn test_fixed_file_names() {
        assert_eq!(ExportFormat::Csv.file_name(), "extraction_results.csv");
        assert_eq!(ExportFormat::Json.mime_type(), "application/json");
        assert_eq!(ExportFormat::Pdf.file_name(), "extraction_results.pdf");
    }
}
