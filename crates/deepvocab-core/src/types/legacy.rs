//! The bundled legacy explanation dataset.
//!
//! A read-only mapping from word (optionally suffixed `:verb`) to either a
//! plain explanation string or an object carrying content and image URLs.
//! It seeds the explanation cache and serves as an offline fallback.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::explanation::{normalize_legacy_key, normalize_word, strip_whitespace, VERB_SUFFIX};

/// One legacy value in either the old (string) or new (object) format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LegacyValue {
    Text(String),
    Entry {
        #[serde(default)]
        content: Option<String>,
        #[serde(default)]
        image_url: Option<String>,
        #[serde(default)]
        image_dicebear: Option<String>,
        #[serde(default)]
        image_pollinations: Option<String>,
    },
}

impl LegacyValue {
    /// Explanation text, if any.
    pub fn content(&self) -> Option<&str> {
        match self {
            LegacyValue::Text(text) => Some(text.as_str()),
            LegacyValue::Entry { content, .. } => content.as_deref(),
        }
    }

    pub fn image_url(&self) -> Option<&str> {
        match self {
            LegacyValue::Entry { image_url, .. } => image_url.as_deref(),
            LegacyValue::Text(_) => None,
        }
    }

    pub fn image_dicebear(&self) -> Option<&str> {
        match self {
            LegacyValue::Entry { image_dicebear, .. } => image_dicebear.as_deref(),
            LegacyValue::Text(_) => None,
        }
    }

    pub fn image_pollinations(&self) -> Option<&str> {
        match self {
            LegacyValue::Entry {
                image_pollinations, ..
            } => image_pollinations.as_deref(),
            LegacyValue::Text(_) => None,
        }
    }
}

/// Read-only legacy dataset. Never mutated after load.
#[derive(Debug, Clone, Default)]
pub struct LegacyDataset {
    // BTreeMap keeps iteration deterministic so "first occurrence wins" is stable.
    entries: BTreeMap<String, LegacyValue>,
    // normalized key -> original key of the first entry that normalizes to it
    index: HashMap<String, String>,
}

impl LegacyDataset {
    /// Build a dataset from raw entries.
    pub fn new(entries: impl IntoIterator<Item = (String, LegacyValue)>) -> Self {
        let entries: BTreeMap<String, LegacyValue> = entries.into_iter().collect();
        let mut index = HashMap::with_capacity(entries.len());
        for key in entries.keys() {
            index
                .entry(normalize_legacy_key(key))
                .or_insert_with(|| key.clone());
        }
        Self { entries, index }
    }

    /// Parse a dataset from a JSON object.
    ///
    /// Values that are neither strings nor objects are ignored.
    pub fn from_json(value: serde_json::Value) -> Self {
        let serde_json::Value::Object(map) = value else {
            tracing::warn!("Legacy dataset is not a JSON object; ignoring it");
            return Self::default();
        };
        Self::new(map.into_iter().filter_map(|(key, value)| {
            serde_json::from_value::<LegacyValue>(value)
                .ok()
                .map(|v| (key, v))
        }))
    }

    /// Number of raw entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate raw `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LegacyValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Look up a word: exact key, then `word:verb`, then case-insensitively.
    pub fn lookup(&self, word: &str) -> Option<&LegacyValue> {
        let word = word.trim();
        if let Some(value) = self.entries.get(word) {
            return Some(value);
        }
        if let Some(value) = self.entries.get(&format!("{}{}", word, VERB_SUFFIX)) {
            return Some(value);
        }
        self.index
            .get(&normalize_word(word))
            .and_then(|key| self.entries.get(key))
    }

    /// Legacy content per normalized key with all whitespace removed.
    ///
    /// Used to recognise exported explanations that are unchanged from the
    /// bundled baseline.
    pub fn normalized_contents(&self) -> HashMap<String, String> {
        let mut contents = HashMap::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            if let Some(content) = value.content().filter(|c| !c.is_empty()) {
                contents
                    .entry(normalize_legacy_key(key))
                    .or_insert_with(|| strip_whitespace(content));
            }
        }
        contents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dataset() -> LegacyDataset {
        LegacyDataset::from_json(json!({
            "run:verb": "to move quickly on foot",
            "Swim": {"content": "to move through water", "image_dicebear": "https://api.dicebear.com/x"},
            "broken": 42
        }))
    }

    #[test]
    fn test_parses_both_formats() {
        let data = dataset();
        assert_eq!(data.len(), 2);
        assert_eq!(
            data.lookup("swim").and_then(|v| v.image_dicebear()),
            Some("https://api.dicebear.com/x")
        );
    }

    #[test]
    fn test_lookup_variants() {
        let data = dataset();
        assert_eq!(
            data.lookup("run").and_then(|v| v.content()),
            Some("to move quickly on foot")
        );
        assert_eq!(
            data.lookup("RUN").and_then(|v| v.content()),
            Some("to move quickly on foot")
        );
        assert!(data.lookup("Swim").is_some());
        assert!(data.lookup("fly").is_none());
    }

    #[test]
    fn test_normalized_contents() {
        let contents = dataset().normalized_contents();
        assert_eq!(contents.get("run").unwrap(), "tomovequicklyonfoot");
        assert_eq!(contents.get("swim").unwrap(), "tomovethroughwater");
    }

    #[test]
    fn test_non_object_is_empty() {
        assert!(LegacyDataset::from_json(json!([1, 2])).is_empty());
    }
}
