// src/pipeline/retry.rs

//! Per-item retry policy.
//!
//! Runs up to `max_retries` attempts and collapses them into one terminal
//! [`Outcome`]. Only network errors wait `retry_delay` before the next
//! attempt; an empty extraction is retried right away.

use std::time::Duration;

use crate::error::AppError;
use crate::models::{Item, PacingConfig};
use crate::services::{FragmentExtractor, Translator};
use crate::utils::log::DiagnosticLog;
use crate::utils::preview;

/// Terminal result of all attempts for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(String),
    NoTranslation,
    Error(String),
}

/// Classification of a single attempt.
#[derive(Debug)]
enum Attempt {
    Success(String),
    NoResult { response_len: usize },
    TransientError(AppError),
    FatalError(AppError),
}

/// Bounded attempts with a fixed delay after network errors.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    retry_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            max_retries: max_retries.max(1),
            retry_delay,
        }
    }

    pub fn from_config(pacing: &PacingConfig) -> Self {
        Self::new(pacing.max_retries, pacing.retry_delay())
    }

    /// Run `item` through the policy until it reaches a terminal outcome.
    pub async fn translate(
        &self,
        translator: &dyn Translator,
        extractor: &FragmentExtractor,
        diagnostics: &DiagnosticLog,
        item: &Item,
    ) -> Outcome {
        for attempt in 1..=self.max_retries {
            let last = attempt == self.max_retries;

            match Self::attempt(translator, extractor, &item.source_text).await {
                Attempt::Success(text) => return Outcome::Success(text),

                Attempt::NoResult { response_len } => {
                    diagnostics.record(&format!(
                        "ID {}: No translation fragment found. Response length: {}",
                        item.id, response_len
                    ));
                    if last {
                        log::warn!(
                            "No translation found for ID {}: {}",
                            item.id,
                            preview(&item.source_text, 50)
                        );
                        return Outcome::NoTranslation;
                    }
                    log::debug!(
                        "Empty result for ID {} (attempt {}/{}), retrying",
                        item.id,
                        attempt,
                        self.max_retries
                    );
                }

                Attempt::TransientError(e) => {
                    if last {
                        log::error!(
                            "Failed after {} attempts for ID {}: {}",
                            self.max_retries,
                            item.id,
                            e
                        );
                        diagnostics.record(&format!("ID {}: Request failed - {}", item.id, e));
                        return Outcome::Error(e.to_string());
                    }
                    log::warn!(
                        "Error for ID {} (attempt {}/{}): {}",
                        item.id,
                        attempt,
                        self.max_retries,
                        e
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }

                Attempt::FatalError(e) => {
                    log::error!("Request for ID {} cannot succeed: {}", item.id, e);
                    diagnostics.record(&format!("ID {}: Request failed - {}", item.id, e));
                    return Outcome::Error(e.to_string());
                }
            }
        }

        Outcome::Error(format!("no attempts made for ID {}", item.id))
    }

    async fn attempt(
        translator: &dyn Translator,
        extractor: &FragmentExtractor,
        text: &str,
    ) -> Attempt {
        match translator.translate(text).await {
            Ok(raw) => match extractor.extract(&raw) {
                Some(translation) => Attempt::Success(translation),
                None => Attempt::NoResult {
                    response_len: raw.len(),
                },
            },
            Err(e) if e.is_transient() => Attempt::TransientError(e),
            Err(e) => Attempt::FatalError(e),
        }
    }
}
