//! Durable state of a scraping job.
//!
//! Everything the job knows between runs lives in plain files:
//!
//! ```text
//! {data_dir}/
//! ├── eng_sentences.tsv          # Input: id, language, text
//! ├── en_tn_couples.csv          # Successes (authoritative done-set)
//! ├── failed_translations.csv    # Failures, appended per run
//! ├── retry_results.csv          # Still failing after the last retry pass
//! ├── .scraper_checkpoint.txt    # Last attempted id (advisory)
//! └── scraper_debug.log          # Diagnostic log
//! ```

pub mod input;
pub mod progress;
pub mod sink;

pub use input::read_items;
pub use progress::ProgressStore;
pub use sink::CsvSink;
