//! Bundled reference data: the legacy explanations and the word list.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::VocabResult;
use crate::types::{parse_word_list, DictionaryEntry, LegacyDataset};

/// Read-only reference data shipped with the application.
///
/// Loaded once and shared; never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct BundledData {
    pub legacy: Arc<LegacyDataset>,
    pub word_list: Arc<Vec<DictionaryEntry>>,
}

impl BundledData {
    pub fn new(legacy: LegacyDataset, word_list: Vec<DictionaryEntry>) -> Self {
        Self {
            legacy: Arc::new(legacy),
            word_list: Arc::new(word_list),
        }
    }

    /// Load both datasets.
    ///
    /// A missing or unparsable file yields an empty dataset and a warning;
    /// the application still runs, only without that reference data.
    pub async fn load(legacy_path: &Path, word_list_path: &Path) -> Self {
        let legacy = match read_json(legacy_path).await {
            Ok(Some(value)) => LegacyDataset::from_json(value),
            Ok(None) => LegacyDataset::default(),
            Err(e) => {
                warn!(path = %legacy_path.display(), error = %e, "Failed to load legacy dataset");
                LegacyDataset::default()
            }
        };

        let word_list = match read_json(word_list_path).await {
            Ok(Some(value)) => parse_word_list(value),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(path = %word_list_path.display(), error = %e, "Failed to load word list");
                Vec::new()
            }
        };

        info!(
            legacy = legacy.len(),
            words = word_list.len(),
            "Loaded bundled data"
        );
        Self::new(legacy, word_list)
    }
}

async fn read_json(path: &Path) -> VocabResult<Option<serde_json::Value>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "Bundled data file not found");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let legacy = dir.path().join("legacy.json");
        let words = dir.path().join("words.json");
        std::fs::write(&legacy, r#"{"run:verb": "to move quickly on foot"}"#).unwrap();
        std::fs::write(&words, r#"{"list": [{"单词": "run", "词频": 5}]}"#).unwrap();

        let data = BundledData::load(&legacy, &words).await;
        assert_eq!(data.legacy.len(), 1);
        assert_eq!(data.word_list.len(), 1);
        assert_eq!(data.word_list[0].frequency, 5);
    }

    #[tokio::test]
    async fn test_missing_and_broken_files_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{").unwrap();

        let data = BundledData::load(&dir.path().join("missing.json"), &broken).await;
        assert!(data.legacy.is_empty());
        assert!(data.word_list.is_empty());
    }
}
