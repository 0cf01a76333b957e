//! Export encoders - CSV, JSON and the paginated tabular document
//!
//! CSV and the tabular document consume normalized rows; JSON serializes the
//! records untouched. `dispatch` ties an encoder to a download sink.

pub mod csv;
pub mod dispatch;
pub mod json;
pub mod layout;
pub mod table;

pub use self::csv::to_csv;
pub use dispatch::{deliver, DownloadSink, ExportDispatcher, FileSink, MemorySink};
pub use json::to_json;
pub use layout::TableLayout;
pub use table::to_table;
