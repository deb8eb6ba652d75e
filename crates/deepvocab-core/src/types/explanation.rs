//! Explanation cache records and query-key normalization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Suffix carried by some legacy keys (`run:verb`).
pub const VERB_SUFFIX: &str = ":verb";

/// How a query is explained: one word at a time, or a word set compared together.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    #[default]
    Single,
    List,
}

impl QueryMode {
    /// Normalize raw query text into the cache key for this mode.
    pub fn normalize(&self, raw: &str) -> String {
        match self {
            QueryMode::Single => normalize_word(raw),
            QueryMode::List => list_key(&split_words(raw)),
        }
    }
}

/// Lowercased, trimmed word.
pub fn normalize_word(word: &str) -> String {
    word.trim().to_lowercase()
}

/// Normalize a legacy dataset key: lowercase and drop a trailing `:verb`.
pub fn normalize_legacy_key(key: &str) -> String {
    let lowered = normalize_word(key);
    match lowered.strip_suffix(VERB_SUFFIX) {
        Some(stripped) => stripped.to_string(),
        None => lowered,
    }
}

/// Sorted, comma-joined, deduplicated set of lowercased words.
pub fn list_key<S: AsRef<str>>(words: &[S]) -> String {
    let mut normalized: Vec<String> = words
        .iter()
        .map(|w| normalize_word(w.as_ref()))
        .filter(|w| !w.is_empty())
        .collect();
    normalized.sort();
    normalized.dedup();
    normalized.join(",")
}

/// Split free-form query text into words.
///
/// Text containing a comma is split on commas, otherwise on whitespace.
/// Entries are trimmed and empty entries dropped.
pub fn split_words(raw: &str) -> Vec<String> {
    let parts: Vec<&str> = if raw.contains(',') {
        raw.split(',').collect()
    } else {
        raw.split_whitespace().collect()
    };
    parts
        .into_iter()
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// A cached explanation for one `(mode, query_key)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplanationRecord {
    pub mode: QueryMode,
    pub query_key: String,
    /// Explanation text; `None` only transiently (image-only entries).
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Provider-specific image URLs carried over from legacy data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_dicebear: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pollinations: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl ExplanationRecord {
    /// Create a record; the query key is stored as given (callers normalize).
    pub fn new(mode: QueryMode, query_key: impl Into<String>, content: Option<String>) -> Self {
        Self {
            mode,
            query_key: query_key.into(),
            content,
            image_url: None,
            image_dicebear: None,
            image_pollinations: None,
            created_at: Utc::now(),
        }
    }

    /// Set the image URL.
    pub fn with_image(mut self, image_url: Option<String>) -> Self {
        self.image_url = image_url;
        self
    }

    /// Storage key for a `(mode, query_key)` pair.
    pub fn storage_key(mode: QueryMode, query_key: &str) -> String {
        format!("{}|{}", mode, query_key)
    }

    /// Content if present and non-empty.
    pub fn content_text(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.is_empty())
    }
}

/// Remove all whitespace, for layout-insensitive content comparison.
pub fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_key_is_lowercase() {
        assert_eq!(QueryMode::Single.normalize("  Run "), "run");
        assert_eq!(QueryMode::Single.normalize("run"), "run");
    }

    #[test]
    fn test_list_key_ignores_order_and_case() {
        assert_eq!(list_key(&["run", "fast"]), "fast,run");
        assert_eq!(list_key(&["Fast", "Run"]), "fast,run");
        assert_eq!(QueryMode::List.normalize("Run, fast"), "fast,run");
        assert_eq!(QueryMode::List.normalize("fast run"), "fast,run");
    }

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("run, walk ,"), vec!["run", "walk"]);
        assert_eq!(split_words(" run  walk "), vec!["run", "walk"]);
        assert!(split_words("   ").is_empty());
    }

    #[test]
    fn test_legacy_key_strips_verb_suffix() {
        assert_eq!(normalize_legacy_key("Run:verb"), "run");
        assert_eq!(normalize_legacy_key("May"), "may");
        assert_eq!(normalize_legacy_key("verb"), "verb");
    }

    #[test]
    fn test_storage_key_and_mode_parsing() {
        assert_eq!(
            ExplanationRecord::storage_key(QueryMode::List, "fast,run"),
            "list|fast,run"
        );
        assert_eq!("single".parse::<QueryMode>().unwrap(), QueryMode::Single);
    }

    #[test]
    fn test_strip_whitespace() {
        assert_eq!(strip_whitespace(" a b\n\tc "), "abc");
    }
}
