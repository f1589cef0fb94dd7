//! Durable CSV sinks.
//!
//! A sink is opened once per run and owned by whoever drives that run.
//! Every appended record is flushed before `append` returns, so the file on
//! disk always holds every record whose outcome has been decided.

use std::fs::{File, OpenOptions};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// An open CSV file receiving one flushed row per record.
pub struct CsvSink {
    writer: csv::Writer<File>,
}

impl CsvSink {
    /// Open `path` for appending, writing `header` only if the file is new
    /// or empty.
    pub fn open_append(path: &Path, header: &[&str]) -> Result<Self> {
        let needs_header = std::fs::metadata(path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Self::with_header(file, needs_header.then_some(header))
    }

    /// Create `path` from scratch, discarding previous content.
    pub fn create(path: &Path, header: &[&str]) -> Result<Self> {
        let file = File::create(path)?;
        Self::with_header(file, Some(header))
    }

    fn with_header(file: File, header: Option<&[&str]>) -> Result<Self> {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        let mut sink = Self { writer };

        if let Some(header) = header {
            sink.writer.write_record(header)?;
            sink.writer.flush()?;
        }
        Ok(sink)
    }

    /// Append one record and flush it to disk.
    pub fn append<T: Serialize>(&mut self, record: &T) -> Result<()> {
        self.writer.serialize(record)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and close the sink.
    pub fn close(mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Read every row of a headed CSV file.
pub fn read_all<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FailureKind, FailureRecord, Item, ResultRecord};
    use tempfile::TempDir;

    #[test]
    fn test_header_written_once_across_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.csv");

        let mut sink = CsvSink::open_append(&path, &ResultRecord::HEADER).unwrap();
        sink.append(&ResultRecord::new(&Item::new("1", "Hi."), "أهلا"))
            .unwrap();
        sink.close().unwrap();

        let mut sink = CsvSink::open_append(&path, &ResultRecord::HEADER).unwrap();
        sink.append(&ResultRecord::new(&Item::new("2", "Bye."), "بالسلامة"))
            .unwrap();
        sink.close().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "id,english,tunisian\n1,Hi.,أهلا\n2,Bye.,بالسلامة\n");
    }

    #[test]
    fn test_header_written_into_empty_existing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("failed.csv");
        std::fs::write(&path, "").unwrap();

        let sink = CsvSink::open_append(&path, &FailureRecord::HEADER).unwrap();
        sink.close().unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "id,english,status\n"
        );
    }

    #[test]
    fn test_append_is_visible_before_close() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("failed.csv");

        let mut sink = CsvSink::open_append(&path, &FailureRecord::HEADER).unwrap();
        sink.append(&FailureRecord::new(
            &Item::new("9", "Hello, world."),
            FailureKind::NoTranslation,
        ))
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.ends_with("9,\"Hello, world.\",no_translation\n"));
        drop(sink);
    }

    #[test]
    fn test_create_truncates() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("retry.csv");
        std::fs::write(&path, "stale\n").unwrap();

        CsvSink::create(&path, &["id", "status"]).unwrap().close().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "id,status\n");
    }

    #[test]
    fn test_read_all_parses_failure_rows() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("failed.csv");
        std::fs::write(
            &path,
            "id,english,status\nA,\"One, two.\",no_translation\nB,Three.,error\n",
        )
        .unwrap();

        let rows: Vec<FailureRecord> = read_all(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].source_text, "One, two.");
        assert_eq!(rows[0].failure_kind, FailureKind::NoTranslation);
        assert_eq!(rows[1].failure_kind, FailureKind::Error);
    }
}
