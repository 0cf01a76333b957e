use thiserror::Error;

/// Errors raised by the export engine
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("PDF generation failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An input element at `position` (1-based) was not a JSON object
    #[error("record {position} is not an object (found {found})")]
    InvalidRecord { position: usize, found: &'static str },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An upstream field collides with the reserved `#` index column
    #[error("field name \"#\" is reserved for the record index")]
    ReservedColumn,
}

pub type Result<T> = std::result::Result<T, ExportError>;
