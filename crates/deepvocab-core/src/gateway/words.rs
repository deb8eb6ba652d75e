//! Word list and the offline basic definition.

use tracing::warn;

use super::QueryGateway;
use crate::api::{WordList, DEFAULT_WORD_LIMIT};
use crate::error::VocabResult;
use crate::types::DictionaryEntry;

const NO_DEFINITION: &str = "暂无释义";
const OFFLINE_NOTICE: &str = "> ⚠️ 正在离线使用。如需深度解析，请在联网后点击“刷新解析”。";

/// Dictionary entry for `word`: exact match first, then case-insensitive.
pub(crate) fn find_entry<'a>(entries: &'a [DictionaryEntry], word: &str) -> Option<&'a DictionaryEntry> {
    let word = word.trim();
    if word.is_empty() {
        return None;
    }
    entries.iter().find(|e| e.word == word).or_else(|| {
        let lowered = word.to_lowercase();
        entries.iter().find(|e| e.word.to_lowercase() == lowered)
    })
}

/// Markdown explanation synthesized from a dictionary entry.
pub fn basic_definition(entry: &DictionaryEntry) -> String {
    let definition = Some(entry.definition.trim())
        .filter(|d| !d.is_empty())
        .unwrap_or(NO_DEFINITION);
    format!(
        "### {} ({})\n\n{}\n\n- **词性**: {}\n- **释义**: {}\n- **词频**: {}",
        entry.original_word,
        definition,
        OFFLINE_NOTICE,
        entry.part_of_speech,
        definition,
        entry.frequency
    )
}

impl QueryGateway {
    /// The first `limit` words of the list (default 6000) and the list size.
    pub async fn list_words(&self, limit: Option<usize>) -> VocabResult<WordList> {
        if let Err(e) = self.ensure_ready().await {
            warn!(error = %e, "Store not ready; serving cached word list");
        }
        let dictionary = self.dictionary();
        let limit = limit.unwrap_or(DEFAULT_WORD_LIMIT);
        Ok(WordList {
            items: dictionary.iter().take(limit).cloned().collect(),
            total: dictionary.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::parse_word_list;
    use serde_json::json;

    fn entries() -> Vec<DictionaryEntry> {
        parse_word_list(json!([
            {"word": "May", "definition": "五月", "pos": "noun", "frequency": 900},
            {"word": "may", "definition": "可能", "pos": "modal", "frequency": 40},
            {"word": "Run", "frequency": 12}
        ]))
    }

    #[test]
    fn test_exact_match_preferred() {
        let entries = entries();
        assert_eq!(find_entry(&entries, "May").unwrap().definition, "五月");
        assert_eq!(find_entry(&entries, "may").unwrap().definition, "可能");
        assert_eq!(find_entry(&entries, "run").unwrap().word, "Run");
        assert!(find_entry(&entries, "fly").is_none());
        assert!(find_entry(&entries, " ").is_none());
    }

    #[test]
    fn test_basic_definition_format() {
        let entries = entries();
        let text = basic_definition(find_entry(&entries, "may").unwrap());
        assert!(text.starts_with("### may (可能)\n\n> ⚠️"));
        assert!(text.contains("- **词性**: modal"));
        assert!(text.ends_with("- **词频**: 40"));

        let bare = basic_definition(find_entry(&entries, "Run").unwrap());
        assert!(bare.starts_with("### Run (暂无释义)"));
        assert!(bare.contains("- **词性**: other"));
    }
}
