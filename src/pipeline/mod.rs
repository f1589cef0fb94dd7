//! Pipeline entry points for scraping operations.
//!
//! - `Scraper::run`: Translate every pending input sentence
//! - `Scraper::retry_failed`: Re-run previously failed sentences

pub mod retry;
mod retry_failed;
pub mod scrape;
pub mod shutdown;

pub use retry::{Outcome, RetryPolicy};
pub use scrape::{RunSummary, Scraper};
pub use shutdown::Shutdown;
