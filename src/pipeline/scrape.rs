// src/pipeline/scrape.rs

//! Resumable scraping run.
//!
//! Items already present in the success or failure sink are skipped, every decided
//! outcome is flushed to its sink before the next request, and a fixed
//! delay separates consecutive items.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::error::Result;
use crate::models::{Config, FailureKind, FailureRecord, Item, ResolvedPaths, ResultRecord};
use crate::services::{FragmentExtractor, Translator};
use crate::storage::{CsvSink, ProgressStore};
use crate::utils::log::DiagnosticLog;

use super::retry::{Outcome, RetryPolicy};
use super::shutdown::Shutdown;

/// Tallies of a scraping or retry run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub success_count: usize,
    pub fail_count: usize,
    /// Stopped by the operator before all items were attempted
    pub interrupted: bool,
    /// Where successes were appended
    pub success_path: PathBuf,
    /// Where failures were written
    pub failure_path: PathBuf,
    /// Last attempted id according to the checkpoint file
    pub last_checkpoint: Option<String>,
}

/// Single-stream translation pipeline over one data directory.
pub struct Scraper<T> {
    pub(super) translator: T,
    pub(super) extractor: FragmentExtractor,
    pub(super) policy: RetryPolicy,
    pub(super) diagnostics: DiagnosticLog,
    pub(super) paths: ResolvedPaths,
    pub(super) request_delay: Duration,
    pub(super) shutdown: Shutdown,
    pub(super) show_progress: bool,
}

impl<T: Translator> Scraper<T> {
    /// Create a scraper with pacing and extraction taken from `config`.
    pub fn new(translator: T, config: &Config, paths: ResolvedPaths) -> Result<Self> {
        Ok(Self {
            translator,
            extractor: FragmentExtractor::new(&config.endpoint.result_selector)?,
            policy: RetryPolicy::from_config(&config.pacing),
            diagnostics: DiagnosticLog::new(&paths.debug_log),
            paths,
            request_delay: config.pacing.request_delay(),
            shutdown: Shutdown::new(),
            show_progress: false,
        })
    }

    /// Use an externally owned stop signal.
    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Show a progress bar while running.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    #[cfg(test)]
    pub(crate) fn paths(&self) -> &ResolvedPaths {
        &self.paths
    }

    pub(super) fn progress_store(&self) -> ProgressStore {
        ProgressStore::new(&self.paths.output, &self.paths.failed, &self.paths.checkpoint)
    }

    /// Empty summary pointing at the sinks of this run.
    pub(super) fn summary(&self, failure_path: &Path) -> RunSummary {
        RunSummary {
            success_path: self.paths.output.clone(),
            failure_path: failure_path.to_path_buf(),
            ..RunSummary::default()
        }
    }

    /// Translate every item not yet recorded in the success or failure sink.
    ///
    /// Recorded failures are left to [`Scraper::retry_failed`].
    pub async fn run(&self, items: Vec<Item>) -> Result<RunSummary> {
        log::info!("Found {} source sentences", items.len());

        let store = self.progress_store();
        let done = store.already_done();
        let failed = store.already_failed();
        let pending: Vec<Item> = items
            .into_iter()
            .filter(|item| !done.contains(&item.id) && !failed.contains(&item.id))
            .collect();

        if !done.is_empty() || !failed.is_empty() {
            log::info!(
                "Found {} already processed sentences ({} failed)",
                done.union(&failed).count(),
                failed.difference(&done).count()
            );
            log::info!("Remaining: {} sentences", pending.len());
        }

        let mut summary = self.summary(&self.paths.failed);
        if pending.is_empty() {
            log::info!("All sentences already processed!");
            summary.last_checkpoint = store.load_checkpoint();
            return Ok(summary);
        }

        let mut successes = CsvSink::open_append(&self.paths.output, &ResultRecord::HEADER)?;
        let mut failures = CsvSink::open_append(&self.paths.failed, &FailureRecord::HEADER)?;

        log::info!(
            "Starting scraping, rate limit: {:.1}s between requests",
            self.request_delay.as_secs_f64()
        );

        let progress = self.progress_bar(pending.len(), "Scraping");
        let result = self
            .process(&pending, &store, &mut successes, &mut failures, &progress, &mut summary)
            .await;
        progress.finish_and_clear();

        let closed = successes.close().and(failures.close());
        summary.last_checkpoint = store.load_checkpoint();
        self.report(&summary);
        result?;
        closed?;

        Ok(summary)
    }

    async fn process(
        &self,
        pending: &[Item],
        store: &ProgressStore,
        successes: &mut CsvSink,
        failures: &mut CsvSink,
        progress: &ProgressBar,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let mut recorded = HashSet::new();

        for (index, item) in pending.iter().enumerate() {
            if self.shutdown.is_requested() {
                summary.interrupted = true;
                break;
            }

            if recorded.contains(&item.id) {
                log::debug!("ID {} already translated in this run, skipping", item.id);
                progress.inc(1);
                continue;
            }

            let outcome = self
                .policy
                .translate(&self.translator, &self.extractor, &self.diagnostics, item)
                .await;

            match outcome {
                Outcome::Success(translation) => {
                    successes.append(&ResultRecord::new(item, translation))?;
                    recorded.insert(item.id.clone());
                    summary.success_count += 1;
                }
                Outcome::NoTranslation => {
                    failures.append(&FailureRecord::new(item, FailureKind::NoTranslation))?;
                    summary.fail_count += 1;
                }
                Outcome::Error(_) => {
                    failures.append(&FailureRecord::new(item, FailureKind::Error))?;
                    summary.fail_count += 1;
                }
            }

            store.mark_checkpoint(&item.id);
            progress.inc(1);

            let is_last = index + 1 == pending.len();
            if !self.pace(is_last).await {
                summary.interrupted = true;
                break;
            }
        }

        Ok(())
    }

    /// Wait out the inter-item delay. Returns `false` if a stop was requested.
    pub(super) async fn pace(&self, is_last: bool) -> bool {
        if is_last {
            return true;
        }
        self.shutdown.sleep(self.request_delay).await
    }

    pub(super) fn progress_bar(&self, len: usize, message: &'static str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new(len as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} {eta}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.set_message(message);
        bar
    }

    fn report(&self, summary: &RunSummary) {
        if summary.interrupted {
            log::warn!("Interrupted by user");
        }
        log::info!("Summary:");
        log::info!("  Successfully scraped: {}", summary.success_count);
        log::info!("  Failed: {}", summary.fail_count);
        log::info!("  Saved to: {}", summary.success_path.display());
        log::info!("  Failed sentences: {}", summary.failure_path.display());
        log::info!("  Debug log: {}", self.diagnostics.path().display());

        if let Some(last_id) = &summary.last_checkpoint {
            log::info!("  Last processed ID: {}", last_id);
            log::info!("  Run again to resume from this point");
        }
    }
}
