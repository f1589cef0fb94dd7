//! Response fragment extraction.
//!
//! The endpoint answers with an HTML document; the translation is the text
//! of one element located by a CSS selector.

use scraper::{Html, Selector};

use crate::error::{AppError, Result};

/// Extracts the translated fragment from a raw response body.
#[derive(Debug, Clone)]
pub struct FragmentExtractor {
    selector: Selector,
}

impl FragmentExtractor {
    /// Create an extractor for the given CSS selector.
    pub fn new(selector: &str) -> Result<Self> {
        Ok(Self {
            selector: parse_selector(selector)?,
        })
    }

    /// Extract the cleaned fragment text, `None` when nothing usable is found.
    pub fn extract(&self, raw: &str) -> Option<String> {
        extract(raw, &self.selector)
    }
}

/// Text of the first element matching `selector`, nested tags stripped and
/// whitespace collapsed. Empty text counts as no result.
pub fn extract(raw: &str, selector: &Selector) -> Option<String> {
    let document = Html::parse_document(raw);
    let element = document.select(selector).next()?;

    let text: String = element.text().collect();
    let cleaned = normalize_whitespace(&text);

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
