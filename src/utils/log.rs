// src/utils/log.rs

//! Diagnostic file log.
//!
//! Append-only, timestamped lines kept for post-hoc debugging of empty
//! extractions and exhausted retries. Nothing reads this file back.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

/// Append-only diagnostic log file.
#[derive(Debug, Clone)]
pub struct DiagnosticLog {
    path: PathBuf,
}

impl DiagnosticLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one timestamped line.
    ///
    /// Failures are reported on the console and otherwise ignored.
    pub fn record(&self, message: &str) {
        if let Err(e) = self.append(message) {
            log::warn!(
                "Could not write to diagnostic log {}: {}",
                self.path.display(),
                e
            );
        }
    }

    fn append(&self, message: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", format_line(message))
    }
}

/// Format a log line with timestamp
fn format_line(message: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    format!("[{}] {}", timestamp, message)
}
