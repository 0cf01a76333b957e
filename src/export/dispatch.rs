//! Export entry points and the download hand-off
//!
//! Every export is computed in full, then handed to a `DownloadSink` as a
//! `(content, file name, MIME type)` artifact. The sink's transient handle is
//! released on every path once it has been acquired.

use crate::error::Result;
use crate::export::{to_csv, to_json, to_table};
use crate::normalize::discover_columns;
use crate::types::{Artifact, ExportConfig, ExportFormat, Record};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Receives finished exports and saves them somewhere
pub trait DownloadSink {
    /// Transient resource holding one artifact until it is saved
    type Handle;

    fn acquire(&mut self, artifact: &Artifact) -> Result<Self::Handle>;

    /// Save the artifact held by `handle`
    fn trigger(&mut self, handle: &Self::Handle) -> Result<()>;

    fn release(&mut self, handle: Self::Handle);
}

/// Acquire a handle for `artifact`, trigger the save, then release the handle
/// whatever the trigger returned.
pub fn deliver<S: DownloadSink + ?Sized>(sink: &mut S, artifact: &Artifact) -> Result<()> {
    let handle = sink.acquire(artifact)?;
    let outcome = sink.trigger(&handle);
    sink.release(handle);
    outcome
}

/// Saves artifacts as files in a directory, staging each one in a temp file
pub struct FileSink {
    dir: PathBuf,
}

/// Staged artifact waiting to be copied to its final name
pub struct StagedFile {
    temp: NamedTempFile,
    target: PathBuf,
}

impl FileSink {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(FileSink {
            dir: dir.as_ref().to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for FileSink {
    type Handle = StagedFile;

    fn acquire(&mut self, artifact: &Artifact) -> Result<StagedFile> {
        let mut temp = NamedTempFile::new_in(&self.dir)?;
        temp.write_all(&artifact.content)?;
        temp.flush()?;
        Ok(StagedFile {
            temp,
            target: self.dir.join(artifact.file_name),
        })
    }

    fn trigger(&mut self, handle: &StagedFile) -> Result<()> {
        fs::copy(handle.temp.path(), &handle.target)?;
        log::info!("saved {}", handle.target.display());
        Ok(())
    }

    fn release(&mut self, handle: StagedFile) {
        if let Err(e) = handle.temp.close() {
            log::warn!("failed to remove staged export: {}", e);
        }
    }
}

/// Keeps saved artifacts in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    /// Artifacts in the order they were saved
    pub saved: Vec<Artifact>,

    /// Handles acquired and not yet released
    pub live_handles: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DownloadSink for MemorySink {
    type Handle = Artifact;

    fn acquire(&mut self, artifact: &Artifact) -> Result<Artifact> {
        self.live_handles += 1;
        Ok(artifact.clone())
    }

    fn trigger(&mut self, handle: &Artifact) -> Result<()> {
        self.saved.push(handle.clone());
        Ok(())
    }

    fn release(&mut self, _handle: Artifact) {
        self.live_handles -= 1;
    }
}

/// Runs one export per user action and hands the result to a sink
pub struct ExportDispatcher<S: DownloadSink> {
    sink: S,
    config: ExportConfig,
}

impl<S: DownloadSink> ExportDispatcher<S> {
    pub fn new(sink: S, config: ExportConfig) -> Self {
        ExportDispatcher { sink, config }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Export in `format`; returns `false` without touching the sink when there is
    /// nothing to export
    pub fn export(&mut self, format: ExportFormat, records: &[Record]) -> Result<bool> {
        match format {
            ExportFormat::Csv => self.export_csv(records),
            ExportFormat::Json => self.export_json(records),
            ExportFormat::Pdf => self.export_pdf(records),
        }
    }

    pub fn export_csv(&mut self, records: &[Record]) -> Result<bool> {
        if records.is_empty() {
            log::warn!("no records to export as CSV");
            return Ok(false);
        }
        let columns = discover_columns(records);
        columns.check_reserved()?;

        let csv = to_csv(records, &columns)?;
        self.hand_off(Artifact::new(ExportFormat::Csv, csv.into_bytes()))
    }

    pub fn export_json(&mut self, records: &[Record]) -> Result<bool> {
        if records.is_empty() {
            log::warn!("no records to export as JSON");
            return Ok(false);
        }
        let json = to_json(records)?;
        self.hand_off(Artifact::new(ExportFormat::Json, json.into_bytes()))
    }

    pub fn export_pdf(&mut self, records: &[Record]) -> Result<bool> {
        if records.is_empty() {
            log::warn!("no records to export as PDF");
            return Ok(false);
        }
        let columns = discover_columns(records);
        columns.check_reserved()?;

        let generated_at = chrono::Local::now().naive_local();
        let pdf = to_table(records, &columns, generated_at, records.len(), &self.config)?;
        self.hand_off(Artifact::new(ExportFormat::Pdf, pdf))
    }

    fn hand_off(&mut self, artifact: Artifact) -> Result<bool> {
        log::debug!("delivering {} ({} bytes)", artifact.file_name, artifact.content.len());
        deliver(&mut self.sink, &artifact)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExportError;
    use serde_json::json;

    fn widget() -> Vec<Record> {
        vec![serde_json::from_value(json!({"title": "Widget", "tags": ["red", "blue"], "price": "9.99"})).unwrap()]
    }

    /// Sink whose save step always fails
    #[derive(Default)]
    struct FailingSink {
        acquired: usize,
        released: usize,
    }

    impl DownloadSink for FailingSink {
        type Handle = ();

        fn acquire(&mut self, _artifact: &Artifact) -> Result<()> {
            self.acquired += 1;
            Ok(())
        }

        fn trigger(&mut self, _handle: &()) -> Result<()> {
            Err(ExportError::Io(std::io::Error::new(std::io::ErrorKind::Other, "save refused")))
        }

        fn release(&mut self, _handle: ()) {
            self.released += 1;
        }
    }

    #[test]
    fn test_empty_collection_is_noop() {
        let mut dispatcher = ExportDispatcher::new(MemorySink::new(), ExportConfig::default());
        for format in ExportFormat::ALL {
            assert!(!dispatcher.export(format, &[]).unwrap());
        }
        assert!(dispatcher.sink().saved.is_empty());
        assert_eq!(dispatcher.sink().live_handles, 0);
    }

    #[test]
    fn test_each_format_delivered_with_fixed_name() {
        let mut dispatcher = ExportDispatcher::new(MemorySink::new(), ExportConfig::default());
        let records = widget();

        assert!(dispatcher.export_csv(&records).unwrap());
        assert!(dispatcher.export_json(&records).unwrap());
        assert!(dispatcher.export_pdf(&records).unwrap());

        let sink = dispatcher.into_sink();
        assert_eq!(sink.live_handles, 0);
        let names: Vec<_> = sink.saved.iter().map(|a| (a.file_name, a.mime_type)).collect();
        assert_eq!(
            names,
            vec![
                ("extraction_results.csv", "text/csv;charset=utf-8"),
                ("extraction_results.json", "application/json"),
                ("extraction_results.pdf", "application/pdf"),
            ]
        );
        assert!(sink.saved[0].content.starts_with("\u{FEFF}".as_bytes()));
    }

    #[test]
    fn test_handle_released_when_trigger_fails() {
        let mut dispatcher = ExportDispatcher::new(FailingSink::default(), ExportConfig::default());
        assert!(dispatcher.export_json(&widget()).is_err());

        let sink = dispatcher.into_sink();
        assert_eq!(sink.acquired, 1);
        assert_eq!(sink.released, 1);
    }

    #[test]
    fn test_reserved_column_refused() {
        let records: Vec<Record> = vec![serde_json::from_value(json!({"#": 7, "name": "x"})).unwrap()];
        let mut dispatcher = ExportDispatcher::new(MemorySink::new(), ExportConfig::default());

        assert!(matches!(dispatcher.export_csv(&records), Err(ExportError::ReservedColumn)));
        assert!(matches!(dispatcher.export_pdf(&records), Err(ExportError::ReservedColumn)));
        // JSON keeps the raw shape and has no index column to collide with
        assert!(dispatcher.export_json(&records).unwrap());
        assert_eq!(dispatcher.sink().saved.len(), 1);
    }

    #[test]
    fn test_repeat_export_identical() {
        let mut dispatcher = ExportDispatcher::new(MemorySink::new(), ExportConfig::default());
        let records = widget();
        dispatcher.export_csv(&records).unwrap();
        dispatcher.export_csv(&records).unwrap();
        dispatcher.export_json(&records).unwrap();
        dispatcher.export_json(&records).unwrap();

        let saved = &dispatcher.sink().saved;
        assert_eq!(saved[0], saved[1]);
        assert_eq!(saved[2], saved[3]);
    }
}
