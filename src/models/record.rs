//! Work items and the records persisted for them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One unit of work: a sentence id and its source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    pub source_text: String,
}

impl Item {
    pub fn new(id: impl Into<String>, source_text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source_text: source_text.into(),
        }
    }
}

/// Why an item ended without a translation.
///
/// Serialized as the `status` column of the failure and retry-results sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The endpoint answered but no fragment could be extracted.
    NoTranslation,
    /// Every attempt failed at the transport level.
    Error,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::NoTranslation => "no_translation",
            FailureKind::Error => "error",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row of the success sink (`id,english,tunisian`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub id: String,
    #[serde(rename = "english")]
    pub source_text: String,
    #[serde(rename = "tunisian")]
    pub translated_text: String,
}

impl ResultRecord {
    pub const HEADER: [&'static str; 3] = ["id", "english", "tunisian"];

    pub fn new(item: &Item, translated_text: impl Into<String>) -> Self {
        Self {
            id: item.id.clone(),
            source_text: item.source_text.clone(),
            translated_text: translated_text.into(),
        }
    }
}

/// Row of the failure sink (`id,english,status`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub id: String,
    #[serde(rename = "english")]
    pub source_text: String,
    #[serde(rename = "status")]
    pub failure_kind: FailureKind,
}

impl FailureRecord {
    pub const HEADER: [&'static str; 3] = ["id", "english", "status"];

    pub fn new(item: &Item, failure_kind: FailureKind) -> Self {
        Self {
            id: item.id.clone(),
            source_text: item.source_text.clone(),
            failure_kind,
        }
    }

    /// Turn the recorded failure back into a work item.
    pub fn into_item(self) -> Item {
        Item {
            id: self.id,
            source_text: self.source_text,
        }
    }
}

/// Row of the retry-results sink (`id,english,tunisian,status`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryRecord {
    pub id: String,
    #[serde(rename = "english")]
    pub source_text: String,
    #[serde(rename = "tunisian")]
    pub translated_text: String,
    pub status: FailureKind,
}

impl RetryRecord {
    pub const HEADER: [&'static str; 4] = ["id", "english", "tunisian", "status"];

    pub fn new(item: &Item, status: FailureKind) -> Self {
        Self {
            id: item.id.clone(),
            source_text: item.source_text.clone(),
            translated_text: String::new(),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_kind_uses_snake_case_status() {
        assert_eq!(FailureKind::NoTranslation.to_string(), "no_translation");
        assert_eq!(FailureKind::Error.to_string(), "error");
    }

    #[test]
    fn failure_record_converts_back_to_item() {
        let item = Item::new("42", "Hello there.");
        let record = FailureRecord::new(&item, FailureKind::Error);
        assert_eq!(record.into_item(), item);
    }

    #[test]
    fn retry_record_leaves_translation_empty() {
        let item = Item::new("7", "Good night.");
        let record = RetryRecord::new(&item, FailureKind::NoTranslation);
        assert!(record.translated_text.is_empty());
        assert_eq!(record.status, FailureKind::NoTranslation);
    }
}
