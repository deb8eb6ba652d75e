//! Lightweight key-value storage for settings and flags.
//!
//! Settings, the excluded-word list, the bundled-data version and the
//! legacy-import marker live in one small JSON document next to the
//! database. They are configuration, not domain data, so they survive a
//! store recreation.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::settings::{Settings, SettingsPatch};
use crate::error::{VocabError, VocabResult};
use crate::types::normalize_word;

/// Contents of the preference document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub settings: Settings,
    pub excluded: BTreeSet<String>,
    /// Bundled-data version the store was last reconciled against.
    pub data_version: Option<u32>,
    /// Whether the legacy explanations have been merged at least once.
    pub legacy_imported: bool,
}

/// Preference document with explicit load and save.
pub struct PreferenceStore {
    path: Option<PathBuf>,
    state: RwLock<Preferences>,
}

impl PreferenceStore {
    /// Load preferences from `path`.
    ///
    /// A missing file yields defaults and is written back immediately; an
    /// unreadable one is logged and replaced with defaults.
    pub fn load(path: impl AsRef<Path>) -> VocabResult<Self> {
        let path = path.as_ref().to_path_buf();
        let (prefs, write_back) = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Preferences>(&content) {
                Ok(prefs) => (prefs, false),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Preference file unreadable; using defaults");
                    (Preferences::default(), true)
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No preference file; bootstrapping defaults");
                (Preferences::default(), true)
            }
            Err(e) => return Err(e.into()),
        };

        let store = Self {
            path: Some(path),
            state: RwLock::new(prefs),
        };
        if write_back {
            store.save()?;
        }
        Ok(store)
    }

    /// Preferences held only in memory.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: RwLock::new(Preferences::default()),
        }
    }

    fn read(&self) -> VocabResult<RwLockReadGuard<'_, Preferences>> {
        self.state
            .read()
            .map_err(|e| VocabError::Internal(format!("preference lock poisoned: {}", e)))
    }

    fn write(&self) -> VocabResult<RwLockWriteGuard<'_, Preferences>> {
        self.state
            .write()
            .map_err(|e| VocabError::Internal(format!("preference lock poisoned: {}", e)))
    }

    /// Write the document to disk (no-op in memory).
    pub fn save(&self) -> VocabResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&*self.read()?)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    fn update<T>(&self, f: impl FnOnce(&mut Preferences) -> T) -> VocabResult<T> {
        let out = {
            let mut prefs = self.write()?;
            f(&mut prefs)
        };
        self.save()?;
        Ok(out)
    }

    /// Snapshot of the whole document.
    pub fn snapshot(&self) -> VocabResult<Preferences> {
        Ok(self.read()?.clone())
    }

    pub fn settings(&self) -> VocabResult<Settings> {
        Ok(self.read()?.settings.clone())
    }

    /// Merge a partial update and return the merged settings.
    pub fn update_settings(&self, patch: SettingsPatch) -> VocabResult<Settings> {
        self.update(|prefs| {
            prefs.settings.merge(patch);
            prefs.settings.clone()
        })
    }

    pub fn replace_settings(&self, settings: Settings) -> VocabResult<()> {
        self.update(|prefs| prefs.settings = settings)
    }

    /// Excluded words, sorted.
    pub fn excluded(&self) -> VocabResult<Vec<String>> {
        Ok(self.read()?.excluded.iter().cloned().collect())
    }

    /// Add or remove one excluded word and return the new list.
    pub fn set_excluded(&self, word: &str, exclude: bool) -> VocabResult<Vec<String>> {
        let word = normalize_word(word);
        if word.is_empty() {
            return Err(VocabError::missing_field("verb"));
        }
        self.update(|prefs| {
            if exclude {
                prefs.excluded.insert(word);
            } else {
                prefs.excluded.remove(&word);
            }
            prefs.excluded.iter().cloned().collect()
        })
    }

    pub fn replace_excluded(&self, words: impl IntoIterator<Item = String>) -> VocabResult<()> {
        let words: BTreeSet<String> = words
            .into_iter()
            .map(|w| normalize_word(&w))
            .filter(|w| !w.is_empty())
            .collect();
        self.update(|prefs| prefs.excluded = words)
    }

    pub fn data_version(&self) -> VocabResult<Option<u32>> {
        Ok(self.read()?.data_version)
    }

    pub fn set_data_version(&self, version: u32) -> VocabResult<()> {
        self.update(|prefs| prefs.data_version = Some(version))
    }

    pub fn legacy_imported(&self) -> VocabResult<bool> {
        Ok(self.read()?.legacy_imported)
    }

    pub fn set_legacy_imported(&self, imported: bool) -> VocabResult<()> {
        self.update(|prefs| prefs.legacy_imported = imported)
    }

    /// Clear the reconciliation markers, and optionally settings and the
    /// excluded list.
    pub fn reset(&self, reset_settings: bool) -> VocabResult<()> {
        self.update(|prefs| {
            prefs.legacy_imported = false;
            prefs.data_version = None;
            if reset_settings {
                prefs.settings = Settings::default();
                prefs.excluded.clear();
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImageProvider;

    #[test]
    fn test_missing_file_bootstraps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs").join("preferences.json");

        let store = PreferenceStore::load(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.settings().unwrap().daily_goal, 40);
        assert!(!store.legacy_imported().unwrap());
    }

    #[test]
    fn test_changes_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");

        {
            let store = PreferenceStore::load(&path).unwrap();
            store
                .update_settings(SettingsPatch {
                    image_provider: Some(ImageProvider::None),
                    ..Default::default()
                })
                .unwrap();
            store.set_excluded("Run", true).unwrap();
            store.set_data_version(9).unwrap();
        }

        let store = PreferenceStore::load(&path).unwrap();
        assert_eq!(store.settings().unwrap().image_provider, ImageProvider::None);
        assert_eq!(store.excluded().unwrap(), vec!["run"]);
        assert_eq!(store.data_version().unwrap(), Some(9));
    }

    #[test]
    fn test_corrupt_file_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = PreferenceStore::load(&path).unwrap();
        assert_eq!(store.snapshot().unwrap(), Preferences::default());
    }

    #[test]
    fn test_excluded_add_remove() {
        let store = PreferenceStore::in_memory();
        store.set_excluded("swim", true).unwrap();
        store.set_excluded("run", true).unwrap();
        assert_eq!(store.set_excluded("swim", false).unwrap(), vec!["run"]);
        assert!(store.set_excluded("  ", true).is_err());
    }

    #[test]
    fn test_reset_keeps_settings_unless_asked() {
        let store = PreferenceStore::in_memory();
        store.set_legacy_imported(true).unwrap();
        store.set_excluded("run", true).unwrap();
        store
            .update_settings(SettingsPatch {
                daily_goal: Some(10),
                ..Default::default()
            })
            .unwrap();

        store.reset(false).unwrap();
        assert!(!store.legacy_imported().unwrap());
        assert_eq!(store.settings().unwrap().daily_goal, 10);
        assert_eq!(store.excluded().unwrap().len(), 1);

        store.reset(true).unwrap();
        assert_eq!(store.settings().unwrap().daily_goal, 40);
        assert!(store.excluded().unwrap().is_empty());
    }
}
