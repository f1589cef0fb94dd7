//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote translation endpoint settings
    #[serde(default)]
    pub endpoint: EndpointConfig,

    /// Rate limiting and retry settings
    #[serde(default)]
    pub pacing: PacingConfig,

    /// Input selection rules
    #[serde(default)]
    pub input: InputConfig,

    /// Locations of the input and the sinks
    #[serde(default)]
    pub paths: PathsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.url.trim().is_empty() {
            return Err(AppError::validation("endpoint.url is empty"));
        }
        url::Url::parse(&self.endpoint.url)?;
        if self.endpoint.user_agent.trim().is_empty() {
            return Err(AppError::validation("endpoint.user_agent is empty"));
        }
        if self.endpoint.timeout_secs == 0 {
            return Err(AppError::validation("endpoint.timeout_secs must be > 0"));
        }
        if scraper::Selector::parse(&self.endpoint.result_selector).is_err() {
            return Err(AppError::validation(format!(
                "endpoint.result_selector '{}' is not a valid CSS selector",
                self.endpoint.result_selector
            )));
        }
        if self.pacing.max_retries == 0 {
            return Err(AppError::validation("pacing.max_retries must be > 0"));
        }
        if self.input.language.trim().is_empty() {
            return Err(AppError::validation("input.language is empty"));
        }
        Ok(())
    }
}

/// Remote endpoint and request payload settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// URL receiving the form-encoded translation request
    #[serde(default = "defaults::url")]
    pub url: String,

    /// Fixed `target_lang` form field
    #[serde(default = "defaults::target_lang")]
    pub target_lang: String,

    /// Fixed `output_alphabet` form field
    #[serde(default = "defaults::output_alphabet")]
    pub output_alphabet: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// CSS selector locating the translated fragment in the response
    #[serde(default = "defaults::result_selector")]
    pub result_selector: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: defaults::url(),
            target_lang: defaults::target_lang(),
            output_alphabet: defaults::output_alphabet(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            result_selector: defaults::result_selector(),
        }
    }
}

/// Delays and retry bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Delay after every item in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Attempts per item before giving up
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Delay between attempts after a network error in milliseconds
    #[serde(default = "defaults::retry_delay")]
    pub retry_delay_ms: u64,
}

impl PacingConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: defaults::request_delay(),
            max_retries: defaults::max_retries(),
            retry_delay_ms: defaults::retry_delay(),
        }
    }
}

/// Input row selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Language tag a row must carry to be selected
    #[serde(default = "defaults::language")]
    pub language: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            language: defaults::language(),
        }
    }
}

/// File locations, relative paths resolve against the data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "defaults::input")]
    pub input: String,

    #[serde(default = "defaults::output")]
    pub output: String,

    #[serde(default = "defaults::failed")]
    pub failed: String,

    #[serde(default = "defaults::retry_output")]
    pub retry_output: String,

    #[serde(default = "defaults::checkpoint")]
    pub checkpoint: String,

    #[serde(default = "defaults::debug_log")]
    pub debug_log: String,
}

impl PathsConfig {
    /// Resolve every path against `base_dir`.
    pub fn resolve(&self, base_dir: &Path) -> ResolvedPaths {
        let join = |p: &str| base_dir.join(p);
        ResolvedPaths {
            input: join(&self.input),
            output: join(&self.output),
            failed: join(&self.failed),
            retry_output: join(&self.retry_output),
            checkpoint: join(&self.checkpoint),
            debug_log: join(&self.debug_log),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input: defaults::input(),
            output: defaults::output(),
            failed: defaults::failed(),
            retry_output: defaults::retry_output(),
            checkpoint: defaults::checkpoint(),
            debug_log: defaults::debug_log(),
        }
    }
}

/// Absolute locations of every file a run touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub input: PathBuf,
    pub output: PathBuf,
    pub failed: PathBuf,
    pub retry_output: PathBuf,
    pub checkpoint: PathBuf,
    pub debug_log: PathBuf,
}

impl ResolvedPaths {
    /// All files placed directly inside `dir` with default names.
    pub fn in_dir(dir: &Path) -> Self {
        PathsConfig::default().resolve(dir)
    }
}

mod defaults {
    // Endpoint defaults
    pub fn url() -> String {
        "https://klemy.qodek.net/staging".into()
    }
    pub fn target_lang() -> String {
        "Tunisian Dialect".into()
    }
    pub fn output_alphabet() -> String {
        "Arabic".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; en-tn-scraper/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn result_selector() -> String {
        "p.fs-3".into()
    }

    // Pacing defaults
    pub fn request_delay() -> u64 {
        5_000
    }
    pub fn max_retries() -> u32 {
        3
    }
    pub fn retry_delay() -> u64 {
        5_000
    }

    // Input defaults
    pub fn language() -> String {
        "eng".into()
    }

    // Path defaults
    pub fn input() -> String {
        "eng_sentences.tsv".into()
    }
    pub fn output() -> String {
        "en_tn_couples.csv".into()
    }
    pub fn failed() -> String {
        "failed_translations.csv".into()
    }
    pub fn retry_output() -> String {
        "retry_results.csv".into()
    }
    pub fn checkpoint() -> String {
        ".scraper_checkpoint.txt".into()
    }
    pub fn debug_log() -> String {
        "scraper_debug.log".into()
    }
}
