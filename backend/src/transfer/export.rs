//! CSV export entry point.
//!
//! The codec stays pure: encoded text is handed to an injected
//! [`ExportSink`] together with the filename and MIME type, so the same
//! entry point serves file writes from the CLI and download responses from
//! the HTTP layer.

use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

use crate::codec;
use crate::error::{ExportError, ExportResult};
use crate::models::{Column, Record};

/// MIME type for exported CSV files.
pub const CSV_MIME: &str = "text/csv;charset=utf-8;";

/// Receives a finished export: filename, MIME type, CSV text.
pub trait ExportSink {
    /// Deliver one export file.
    fn deliver(&mut self, filename: &str, mime: &str, content: &str) -> ExportResult<()>;
}

/// Export filename: `{base}_{YYYY-MM-DD}.csv`.
pub fn export_filename(base: &str, date: NaiveDate) -> String {
    format!("{}_{}.csv", base, date.format("%Y-%m-%d"))
}

/// Template filename: `{base}_sample.csv`.
pub fn sample_filename(base: &str) -> String {
    format!("{}_sample.csv", base)
}

/// Encode records and deliver them through the sink.
///
/// An empty record list with a non-empty column list delivers header-only
/// text. Returns the filename used.
pub fn export_csv<S: ExportSink>(
    records: &[Record],
    columns: &[Column],
    base: &str,
    date: NaiveDate,
    sink: &mut S,
) -> ExportResult<String> {
    let filename = export_filename(base, date);
    let text = codec::encode(records, columns);
    sink.deliver(&filename, CSV_MIME, &text)?;
    Ok(filename)
}

/// Deliver a header-only import template for the column list.
pub fn export_sample<S: ExportSink>(
    columns: &[Column],
    base: &str,
    sink: &mut S,
) -> ExportResult<String> {
    let filename = sample_filename(base);
    let text = codec::encode(&[], columns);
    sink.deliver(&filename, CSV_MIME, &text)?;
    Ok(filename)
}

/// Sink writing export files into a directory (CLI use).
pub struct DirSink {
    dir: PathBuf,
}

impl DirSink {
    /// Create a sink targeting `dir`. The directory must already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ExportSink for DirSink {
    fn deliver(&mut self, filename: &str, _mime: &str, content: &str) -> ExportResult<()> {
        fs::write(self.dir.join(filename), content)?;
        Ok(())
    }
}

/// Sink capturing the export in memory (HTTP responses, tests).
#[derive(Debug, Default)]
pub struct MemorySink {
    /// Filename of the last delivered export.
    pub filename: Option<String>,
    /// MIME type of the last delivered export.
    pub mime: Option<String>,
    /// CSV text of the last delivered export.
    pub content: Option<String>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExportSink for MemorySink {
    fn deliver(&mut self, filename: &str, mime: &str, content: &str) -> ExportResult<()> {
        self.filename = Some(filename.to_string());
        self.mime = Some(mime.to_string());
        self.content = Some(content.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Entity;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
    }

    #[test]
    fn test_filenames() {
        assert_eq!(export_filename("customers", date()), "customers_2026-08-07.csv");
        assert_eq!(sample_filename("products"), "products_sample.csv");
    }

    #[test]
    fn test_export_through_memory_sink() {
        let columns = Entity::Customers.columns();
        let mut record = Record::new();
        record.set("name", "Ann".into());
        record.set("phone", "555-0101".into());

        let mut sink = MemorySink::new();
        let filename = export_csv(&[record], &columns, "customers", date(), &mut sink).unwrap();

        assert_eq!(filename, "customers_2026-08-07.csv");
        assert_eq!(sink.mime.as_deref(), Some(CSV_MIME));
        let content = sink.content.unwrap();
        assert!(content.starts_with("Name,Phone,Email,Birthday,Membership Type,Notes"));
        assert!(content.contains("Ann,555-0101"));
    }

    #[test]
    fn test_sample_is_header_only() {
        let columns = Entity::Products.columns();
        let mut sink = MemorySink::new();
        let filename = export_sample(&columns, "products", &mut sink).unwrap();

        assert_eq!(filename, "products_sample.csv");
        let content = sink.content.unwrap();
        assert_eq!(content, "Product Name,Category,Price,Stock,Supplier");
        assert!(!content.ends_with('\n'));
    }

    #[test]
    fn test_dir_sink_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirSink::new(dir.path());
        let columns = Entity::Staff.columns();

        let filename = export_sample(&columns, "staff", &mut sink).unwrap();

        let written = fs::read_to_string(dir.path().join(&filename)).unwrap();
        assert_eq!(written, "Name,Role,Phone,Hire Date,Specialties");
    }
}
