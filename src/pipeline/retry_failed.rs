// src/pipeline/retry_failed.rs

//! Re-processing pass over recorded failures.
//!
//! Successes are merged into the primary success sink. Items still failing
//! are written to a retry-results file that each pass rewrites from scratch.

use std::collections::HashSet;

use crate::error::Result;
use crate::models::{FailureKind, FailureRecord, Item, ResultRecord, RetryRecord};
use crate::services::Translator;
use crate::storage::{CsvSink, sink};

use super::retry::Outcome;
use super::scrape::{RunSummary, Scraper};

impl<T: Translator> Scraper<T> {
    /// Retry every item recorded in the failure sink.
    pub async fn retry_failed(&self) -> Result<RunSummary> {
        if !self.paths.failed.exists() {
            log::warn!("No failure file found at {}", self.paths.failed.display());
            return Ok(self.summary(&self.paths.retry_output));
        }

        let failed: Vec<FailureRecord> = sink::read_all(&self.paths.failed)?;
        let items = unique_items(failed);
        log::info!("Found {} failed translations to retry", items.len());

        if items.is_empty() {
            log::info!("No failed translations to retry!");
            return Ok(self.summary(&self.paths.retry_output));
        }

        let mut done = self.progress_store().already_done();
        let mut successes = CsvSink::open_append(&self.paths.output, &ResultRecord::HEADER)?;
        let mut retries = CsvSink::create(&self.paths.retry_output, &RetryRecord::HEADER)?;

        let mut summary = self.summary(&self.paths.retry_output);
        let progress = self.progress_bar(items.len(), "Retrying");
        let result = async {
            for (index, item) in items.iter().enumerate() {
                if self.shutdown.is_requested() {
                    summary.interrupted = true;
                    break;
                }

                if done.contains(&item.id) {
                    log::info!("ID {} already translated, skipping", item.id);
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
                        done.insert(item.id.clone());
                        summary.success_count += 1;
                        log::info!("Retried ID {}: success", item.id);
                    }
                    Outcome::NoTranslation => {
                        retries.append(&RetryRecord::new(item, FailureKind::NoTranslation))?;
                        log::info!("Retried ID {}: no translation found", item.id);
                        summary.fail_count += 1;
                    }
                    Outcome::Error(e) => {
                        retries.append(&RetryRecord::new(item, FailureKind::Error))?;
                        log::info!("Retried ID {}: still failing ({})", item.id, e);
                        summary.fail_count += 1;
                    }
                }

                progress.inc(1);

                let is_last = index + 1 == items.len();
                if !self.pace(is_last).await {
                    summary.interrupted = true;
                    break;
                }
            }
            Ok::<(), crate::error::AppError>(())
        }
        .await;
        progress.finish_and_clear();

        let closed = successes.close().and(retries.close());

        if summary.interrupted {
            log::warn!("Interrupted by user");
        }
        log::info!("Retry summary:");
        log::info!("  Now successful: {}", summary.success_count);
        log::info!("  Still failed: {}", summary.fail_count);
        log::info!("  Results saved to: {}", summary.failure_path.display());

        result?;
        closed?;
        Ok(summary)
    }
}

/// Failure rows as work items, first occurrence of each id only.
fn unique_items(failed: Vec<FailureRecord>) -> Vec<Item> {
    let mut seen = HashSet::new();
    failed
        .into_iter()
        .filter(|record| seen.insert(record.id.clone()))
        .map(FailureRecord::into_item)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Config, ResolvedPaths};
    use crate::pipeline::Shutdown;
    use crate::pipeline::testing::{Reply, ScriptedTranslator};
    use tempfile::TempDir;

    fn scraper(tmp: &TempDir, translator: ScriptedTranslator) -> Scraper<ScriptedTranslator> {
        let mut config = Config::default();
        config.pacing.request_delay_ms = 0;
        config.pacing.retry_delay_ms = 0;
        Scraper::new(translator, &config, ResolvedPaths::in_dir(tmp.path())).unwrap()
    }

    fn read(path: &std::path::Path) -> String {
        std::fs::read_to_string(path).unwrap()
    }

    fn seed(tmp: &TempDir) -> ResolvedPaths {
        let paths = ResolvedPaths::in_dir(tmp.path());
        std::fs::write(&paths.output, "id,english,tunisian\n1,Hello.,أهلا\n").unwrap();
        std::fs::write(
            &paths.failed,
            "id,english,status\nA,Thank you.,no_translation\nB,\"Yes, sure.\",error\n",
        )
        .unwrap();
        paths
    }

    #[tokio::test]
    async fn test_merges_successes_and_records_remaining() {
        let tmp = TempDir::new().unwrap();
        let paths = seed(&tmp);
        let translator = ScriptedTranslator::new(Reply::Fail)
            .script("Thank you.", vec![Reply::Translate("يعيشك")]);
        let scraper = scraper(&tmp, translator);

        let summary = scraper.retry_failed().await.unwrap();

        assert_eq!(summary.success_count, 1);
        assert_eq!(summary.fail_count, 1);
        assert_eq!(
            read(&paths.output),
            "id,english,tunisian\n1,Hello.,أهلا\nA,Thank you.,يعيشك\n"
        );

        let retry = read(&paths.retry_output);
        assert_eq!(retry, "id,english,tunisian,status\nB,\"Yes, sure.\",,error\n");
        assert!(!retry.contains("A,"));

        let rows: Vec<RetryRecord> = sink::read_all(&paths.retry_output).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, FailureKind::Error);
        assert_eq!(summary.success_path, paths.output);
        assert_eq!(summary.failure_path, paths.retry_output);
    }

    #[tokio::test]
    async fn test_retry_output_rewritten_each_pass() {
        let tmp = TempDir::new().unwrap();
        let paths = seed(&tmp);

        let first = scraper(&tmp, ScriptedTranslator::new(Reply::Empty));
        first.retry_failed().await.unwrap();
        assert_eq!(read(&paths.retry_output).lines().count(), 3);

        let second = scraper(&tmp, ScriptedTranslator::new(Reply::Echo));
        let summary = second.retry_failed().await.unwrap();

        assert_eq!(summary.success_count, 2);
        assert_eq!(read(&paths.retry_output), "id,english,tunisian,status\n");
    }

    #[tokio::test]
    async fn test_already_translated_ids_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let paths = seed(&tmp);
        std::fs::write(
            &paths.failed,
            "id,english,status\n1,Hello.,error\nA,Thank you.,error\nA,Thank you.,no_translation\n",
        )
        .unwrap();
        let scraper = scraper(&tmp, ScriptedTranslator::new(Reply::Echo));

        let summary = scraper.retry_failed().await.unwrap();

        assert_eq!(scraper.translator.calls(), vec!["Thank you."]);
        assert_eq!(summary.success_count, 1);
        assert_eq!(read(&paths.output).matches("\n1,").count(), 1);
    }

    #[tokio::test]
    async fn test_interrupt_keeps_recorded_results() {
        let tmp = TempDir::new().unwrap();
        let paths = seed(&tmp);
        let shutdown = Shutdown::new();
        let translator = ScriptedTranslator::new(Reply::Echo).stop_after(1, shutdown.clone());
        let scraper = scraper(&tmp, translator).with_shutdown(shutdown);

        let summary = scraper.retry_failed().await.unwrap();

        assert!(summary.interrupted);
        assert_eq!(summary.success_count, 1);
        assert_eq!(scraper.translator.call_count(), 1);
        assert!(read(&paths.output).contains("A,Thank you.,TN Thank you."));
    }

    #[tokio::test]
    async fn test_missing_failure_file_is_a_no_op() {
        let tmp = TempDir::new().unwrap();
        let scraper = scraper(&tmp, ScriptedTranslator::new(Reply::Echo));

        let summary = scraper.retry_failed().await.unwrap();

        assert_eq!(summary.success_count + summary.fail_count, 0);
        assert_eq!(summary.failure_path, scraper.paths().retry_output);
        assert!(!scraper.paths().retry_output.exists());
        assert_eq!(scraper.translator.call_count(), 0);
    }
}
