//! Resume bookkeeping.
//!
//! The success sink is the only record of what is translated. Ids in the
//! failure sink are already logged and left to the re-processing pass. The
//! checkpoint file holds the last attempted id for the operator and is never
//! read for deduplication.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};

/// Derives the done-set from the sinks and keeps the checkpoint.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    output: PathBuf,
    failed: PathBuf,
    checkpoint: PathBuf,
}

impl ProgressStore {
    pub fn new(
        output: impl Into<PathBuf>,
        failed: impl Into<PathBuf>,
        checkpoint: impl Into<PathBuf>,
    ) -> Self {
        Self {
            output: output.into(),
            failed: failed.into(),
            checkpoint: checkpoint.into(),
        }
    }

    /// Ids already present in the success sink.
    ///
    /// An unreadable sink is moved aside to `<name>.csv.backup` and an empty
    /// set is returned.
    pub fn already_done(&self) -> HashSet<String> {
        match self.read_ids() {
            Ok(ids) => ids,
            Err(e) => {
                log::warn!("Could not read existing output ({}). Starting fresh.", e);
                self.quarantine();
                HashSet::new()
            }
        }
    }

    /// Ids already recorded in the failure sink.
    ///
    /// An unreadable failure sink is left in place and yields an empty set.
    pub fn already_failed(&self) -> HashSet<String> {
        read_id_column(&self.failed).unwrap_or_else(|e| {
            log::warn!("Could not read failure file ({}). Ignoring it.", e);
            HashSet::new()
        })
    }

    /// Ids in the success sink, failing instead of quarantining on bad data.
    pub fn read_ids(&self) -> Result<HashSet<String>> {
        read_id_column(&self.output)
    }

    fn quarantine(&self) {
        if !self.output.exists() {
            return;
        }
        let backup = backup_path(&self.output);
        match fs::rename(&self.output, &backup) {
            Ok(()) => log::warn!("Backed up existing file to: {}", backup.display()),
            Err(e) => log::error!(
                "Could not move {} aside: {}",
                self.output.display(),
                e
            ),
        }
    }

    /// Record `id` as the last attempted item. Best effort.
    pub fn mark_checkpoint(&self, id: &str) {
        if let Err(e) = fs::write(&self.checkpoint, id) {
            log::warn!(
                "Could not write checkpoint {}: {}",
                self.checkpoint.display(),
                e
            );
        }
    }

    /// Last attempted id, if a checkpoint exists.
    pub fn load_checkpoint(&self) -> Option<String> {
        let content = fs::read_to_string(&self.checkpoint).ok()?;
        let id = content.trim();
        (!id.is_empty()).then(|| id.to_string())
    }
}

/// Non-empty values of the `id` column. A missing or empty file has none.
fn read_id_column(path: &Path) -> Result<HashSet<String>> {
    let mut ids = HashSet::new();
    match fs::metadata(path) {
        Ok(meta) if meta.len() == 0 => return Ok(ids),
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ids),
        Err(e) => return Err(AppError::corrupt_progress(path, e)),
    }

    let corrupt = |e: csv::Error| AppError::corrupt_progress(path, e);

    let mut reader = csv::Reader::from_path(path).map_err(corrupt)?;
    let id_column = reader
        .headers()
        .map_err(corrupt)?
        .iter()
        .position(|h| h == "id")
        .ok_or_else(|| AppError::corrupt_progress(path, "missing 'id' column"))?;

    for record in reader.records() {
        let record = record.map_err(corrupt)?;
        match record.get(id_column) {
            Some(id) if !id.is_empty() => {
                ids.insert(id.to_string());
            }
            _ => {}
        }
    }
    Ok(ids)
}

/// `<name>.csv.backup`, or a timestamped variant when that one is taken.
fn backup_path(output: &Path) -> PathBuf {
    let backup = output.with_extension("csv.backup");
    if !backup.exists() {
        return backup;
    }
    let stamp = chrono::Local::now().format("%Y%m%d%H%M%S");
    let mut candidate = output.with_extension(format!("csv.{stamp}.backup"));
    let mut n = 1;
    while candidate.exists() {
        candidate = output.with_extension(format!("csv.{stamp}-{n}.backup"));
        n += 1;
    }
    candidate
}
