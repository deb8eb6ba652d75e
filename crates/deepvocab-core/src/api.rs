//! Parameter and result records of the gateway operations.
//!
//! These are the shapes exchanged over the request surface; the HTTP layer
//! (de)serializes them as JSON bodies unchanged.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{split_words, DictionaryEntry, QueryMode, ReviewOutcome, ReviewStatus};

/// Words given either as free text or as a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VerbsInput {
    Text(String),
    List(Vec<String>),
}

impl VerbsInput {
    /// Trimmed, non-empty words. Text is split on commas if it has any,
    /// otherwise on whitespace.
    pub fn words(&self) -> Vec<String> {
        match self {
            VerbsInput::Text(text) => split_words(text),
            VerbsInput::List(words) => words
                .iter()
                .map(|w| w.trim())
                .filter(|w| !w.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

impl From<&str> for VerbsInput {
    fn from(text: &str) -> Self {
        VerbsInput::Text(text.to_string())
    }
}

impl From<Vec<&str>> for VerbsInput {
    fn from(words: Vec<&str>) -> Self {
        VerbsInput::List(words.into_iter().map(str::to_string).collect())
    }
}

/// Explain request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExplainParams {
    #[serde(default)]
    pub verbs: Option<VerbsInput>,
    #[serde(default)]
    pub mode: QueryMode,
    /// Bypass the cache and ask the explainer again.
    #[serde(default)]
    pub refresh: bool,
    /// Part of speech hint for the explainer.
    #[serde(default)]
    pub pos: Option<String>,
    /// Only resolve images; never call the explainer.
    #[serde(default)]
    pub only_images: bool,
}

impl ExplainParams {
    pub fn new(verbs: impl Into<VerbsInput>, mode: QueryMode) -> Self {
        Self {
            verbs: Some(verbs.into()),
            mode,
            ..Default::default()
        }
    }

    pub fn refresh(mut self) -> Self {
        self.refresh = true;
        self
    }

    pub fn only_images(mut self) -> Self {
        self.only_images = true;
        self
    }
}

/// Explain result. Single-mode sections are joined by [`SECTION_SEPARATOR`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExplainResult {
    pub result: String,
    #[serde(default)]
    pub images: BTreeMap<String, String>,
    /// Words that could not be explained.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

/// Separator between the per-word sections of a single-mode result.
pub const SECTION_SEPARATOR: &str = "\n\n---\n\n";

/// Generic status reply of administrative operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReply {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StatusReply {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Record-review request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewParams {
    pub verb: String,
    pub result: ReviewOutcome,
}

/// Outcome of a review or mastery override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewReply {
    pub status: String,
    pub new_stage: u8,
    pub review_status: ReviewStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_review: Option<DateTime<Utc>>,
}

/// Request naming one word.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerbParams {
    #[serde(default)]
    pub verb: Option<String>,
}

/// Check-in request; a missing date means today.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckInParams {
    #[serde(default)]
    pub date: Option<String>,
}

/// Learn-batch request: add `verb`, or clear the batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchParams {
    #[serde(default)]
    pub verb: Option<String>,
    #[serde(default)]
    pub clear: bool,
}

/// Word-list page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordList {
    pub items: Vec<DictionaryEntry>,
    pub total: usize,
}

/// Default page size of the word list.
pub const DEFAULT_WORD_LIMIT: usize = 6000;

/// Cache check request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckCacheParams {
    pub verbs: VerbsInput,
    #[serde(default)]
    pub mode: Option<QueryMode>,
}

/// Cache check reply: hit keys for a list, a flag for a single query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CheckCacheReply {
    Hits(Vec<String>),
    Single { cached: bool },
}

/// Clear-all request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClearAllParams {
    /// Also reset settings and the excluded list.
    #[serde(default)]
    pub reset_settings: bool,
}

/// Exclude request; without `verb` it only lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExcludeParams {
    #[serde(default)]
    pub verb: Option<String>,
    #[serde(default)]
    pub exclude: bool,
}

/// Daily goal statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyGoalStats {
    pub daily_goal: u32,
    pub new_words_today: usize,
    pub due_words_remaining: usize,
}

/// Image URL reply; `None` when images are disabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageReply {
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_verbs_input_forms() {
        let text: VerbsInput = serde_json::from_value(json!("run, walk")).unwrap();
        assert_eq!(text.words(), vec!["run", "walk"]);

        let list: VerbsInput = serde_json::from_value(json!([" run ", "", "walk"])).unwrap();
        assert_eq!(list.words(), vec!["run", "walk"]);
    }

    #[test]
    fn test_explain_params_defaults() {
        let params: ExplainParams = serde_json::from_value(json!({"verbs": "run"})).unwrap();
        assert_eq!(params.mode, QueryMode::Single);
        assert!(!params.refresh);
        assert!(!params.only_images);
    }

    #[test]
    fn test_check_cache_reply_shapes() {
        assert_eq!(
            serde_json::to_value(CheckCacheReply::Hits(vec!["run".into()])).unwrap(),
            json!(["run"])
        );
        assert_eq!(
            serde_json::to_value(CheckCacheReply::Single { cached: true }).unwrap(),
            json!({"cached": true})
        );
    }

    #[test]
    fn test_status_reply() {
        assert_eq!(
            serde_json::to_value(StatusReply::success()).unwrap(),
            json!({"status": "success"})
        );
        assert!(!StatusReply::error("nope").is_success());
    }
}
