//! Static word-list entries and the adapter for the bundled list format.
//!
//! The bundled list exists in two naming schemes: English field names
//! (`word`, `frequency`, `definition`, ...) and the original Chinese column
//! headers (`单词`, `词频`, `释义`, ...). Both are read into
//! [`RawDictionaryEntry`] and mapped onto the canonical [`DictionaryEntry`]
//! by [`DictionaryEntry::from_raw`], which skips records without a word.

use serde::{Deserialize, Deserializer, Serialize};

/// Part of speech used when the source omits one.
pub const DEFAULT_PART_OF_SPEECH: &str = "other";

/// One word of the static list, keyed by the exact (case-sensitive) word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    /// Primary key; exact source string so "May" and "may" stay distinct.
    pub word: String,
    /// Frequency rank.
    pub frequency: i64,
    #[serde(rename = "pos")]
    pub part_of_speech: String,
    pub definition: String,
    #[serde(default)]
    pub alternative_spelling: Option<String>,
    pub sequence: i64,
    /// Source casing of the word.
    pub original_word: String,
}

/// A word-list record in either supported naming scheme.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDictionaryEntry {
    #[serde(default)]
    pub word: Option<String>,
    #[serde(default, rename = "单词")]
    pub word_zh: Option<String>,

    #[serde(default, deserialize_with = "lenient_int")]
    pub frequency: Option<i64>,
    #[serde(default, rename = "词频", deserialize_with = "lenient_int")]
    pub frequency_zh: Option<i64>,

    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default, rename = "释义")]
    pub definition_zh: Option<String>,

    #[serde(default)]
    pub pos: Option<String>,
    #[serde(default)]
    pub part_of_speech: Option<String>,

    #[serde(default)]
    pub alternative_spelling: Option<String>,
    #[serde(default, rename = "其他拼写")]
    pub alternative_spelling_zh: Option<String>,

    #[serde(default, deserialize_with = "lenient_int")]
    pub sequence: Option<i64>,
    #[serde(default, rename = "序号", deserialize_with = "lenient_int")]
    pub sequence_zh: Option<i64>,

    #[serde(default)]
    pub original_word: Option<String>,
}

impl DictionaryEntry {
    /// Map a raw record onto the canonical entry.
    ///
    /// Returns `None` when neither naming scheme yields a non-blank word.
    pub fn from_raw(raw: RawDictionaryEntry) -> Option<Self> {
        let word = first_non_blank([raw.word_zh, raw.word])?;

        let original_word = raw
            .original_word
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty())
            .unwrap_or_else(|| word.clone());

        Some(Self {
            original_word,
            frequency: raw.frequency_zh.or(raw.frequency).unwrap_or(0),
            definition: raw.definition_zh.or(raw.definition).unwrap_or_default(),
            part_of_speech: first_non_blank([raw.pos, raw.part_of_speech])
                .unwrap_or_else(|| DEFAULT_PART_OF_SPEECH.to_string()),
            alternative_spelling: first_non_blank([
                raw.alternative_spelling_zh,
                raw.alternative_spelling,
            ]),
            sequence: raw.sequence_zh.or(raw.sequence).unwrap_or(0),
            word,
        })
    }
}

fn first_non_blank<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
}

/// Accept integers given as JSON numbers or numeric strings.
fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(serde_json::Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

/// Parse a bundled word list.
///
/// Accepts either a bare JSON array or an object whose first array-valued
/// field holds the list. Records without a resolvable word are skipped.
pub fn parse_word_list(value: serde_json::Value) -> Vec<DictionaryEntry> {
    let items = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(map) => map
            .into_iter()
            .find_map(|(_, v)| match v {
                serde_json::Value::Array(items) => Some(items),
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    let total = items.len();
    let entries: Vec<DictionaryEntry> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<RawDictionaryEntry>(item).ok())
        .filter_map(DictionaryEntry::from_raw)
        .collect();

    if entries.len() < total {
        tracing::warn!(
            "Skipped {} word-list records without a resolvable word",
            total - entries.len()
        );
    }
    entries
}
