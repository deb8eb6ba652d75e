//! Configuration system for deepvocab.

mod preferences;
mod settings;

pub use preferences::{PreferenceStore, Preferences};
pub use settings::{ImageProvider, LlmProvider, Settings, SettingsPatch, DEFAULT_DAILY_GOAL};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{VocabError, VocabResult};

/// Reference-data reconciliation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Bundled data version; raising it forces a one-time refresh.
    pub data_version: u32,
    /// Legacy explanations at or below this length are not imported.
    pub min_content_len: usize,
    /// Exact size of the bundled word list.
    pub expected_dictionary_size: usize,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            data_version: 9,
            min_content_len: 10,
            expected_dictionary_size: 5530,
        }
    }
}

/// Main deepvocab configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabConfig {
    /// Directory holding the database, preferences and bundled data.
    pub data_dir: PathBuf,
    /// SQLite database (default: `<data_dir>/deepvocab.db`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
    /// Preference document (default: `<data_dir>/preferences.json`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences_path: Option<PathBuf>,
    /// Bundled legacy explanations (default: `<data_dir>/legacy_data.json`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legacy_data_path: Option<PathBuf>,
    /// Bundled word list (default: `<data_dir>/word_list.json`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_list_path: Option<PathBuf>,
    /// Bounded wait for opening the store.
    pub open_timeout_ms: u64,
    /// Bounded wait for one explainer call.
    pub explain_timeout_ms: u64,
    /// Base URL of an optional remote sync source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_sync_url: Option<String>,
    pub reconcile: ReconcileConfig,
}

impl Default for VocabConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .map(|d| d.join("deepvocab"))
            .unwrap_or_else(|| PathBuf::from(".deepvocab"));

        Self {
            data_dir,
            database_path: None,
            preferences_path: None,
            legacy_data_path: None,
            word_list_path: None,
            open_timeout_ms: 2_000,
            explain_timeout_ms: 60_000,
            remote_sync_url: None,
            reconcile: ReconcileConfig::default(),
        }
    }
}

impl VocabConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<Path>) -> VocabResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        let config: Self = match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| VocabError::Configuration(e.to_string()))?
            }
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| VocabError::Configuration(e.to_string()))?,
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| VocabError::Configuration(e.to_string()))?,
            _ => {
                return Err(VocabError::Configuration(
                    "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
                ))
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    ///
    /// Reads:
    /// - `DEEPVOCAB_DATA_DIR`
    /// - `DEEPVOCAB_DB_PATH`
    /// - `DEEPVOCAB_PREFERENCES_PATH`
    /// - `DEEPVOCAB_LEGACY_DATA`
    /// - `DEEPVOCAB_WORD_LIST`
    /// - `DEEPVOCAB_OPEN_TIMEOUT_MS` (default: 2000)
    /// - `DEEPVOCAB_EXPLAIN_TIMEOUT_MS` (default: 60000)
    /// - `DEEPVOCAB_REMOTE_SYNC_URL`
    /// - `DEEPVOCAB_DATA_VERSION` (default: 9)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("DEEPVOCAB_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(path) = std::env::var("DEEPVOCAB_DB_PATH") {
            config.database_path = Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var("DEEPVOCAB_PREFERENCES_PATH") {
            config.preferences_path = Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var("DEEPVOCAB_LEGACY_DATA") {
            config.legacy_data_path = Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var("DEEPVOCAB_WORD_LIST") {
            config.word_list_path = Some(PathBuf::from(path));
        }
        if let Ok(ms) = std::env::var("DEEPVOCAB_OPEN_TIMEOUT_MS") {
            if let Ok(ms) = ms.parse() {
                config.open_timeout_ms = ms;
            }
        }
        if let Ok(ms) = std::env::var("DEEPVOCAB_EXPLAIN_TIMEOUT_MS") {
            if let Ok(ms) = ms.parse() {
                config.explain_timeout_ms = ms;
            }
        }
        if let Ok(url) = std::env::var("DEEPVOCAB_REMOTE_SYNC_URL") {
            if !url.trim().is_empty() {
                config.remote_sync_url = Some(url);
            }
        }
        if let Ok(version) = std::env::var("DEEPVOCAB_DATA_VERSION") {
            if let Ok(version) = version.parse() {
                config.reconcile.data_version = version;
            }
        }

        config
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> VocabConfigBuilder {
        VocabConfigBuilder::default()
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> VocabResult<()> {
        if self.open_timeout_ms == 0 {
            return Err(VocabError::Configuration(
                "open_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.explain_timeout_ms == 0 {
            return Err(VocabError::Configuration(
                "explain_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if let Some(url) = &self.remote_sync_url {
            url::Url::parse(url).map_err(|e| {
                VocabError::Configuration(format!("Invalid remote_sync_url '{}': {}", url, e))
            })?;
        }
        Ok(())
    }

    pub fn database_file(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("deepvocab.db"))
    }

    pub fn preferences_file(&self) -> PathBuf {
        self.preferences_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("preferences.json"))
    }

    pub fn legacy_data_file(&self) -> PathBuf {
        self.legacy_data_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("legacy_data.json"))
    }

    pub fn word_list_file(&self) -> PathBuf {
        self.word_list_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("word_list.json"))
    }

    pub fn open_timeout(&self) -> Duration {
        Duration::from_millis(self.open_timeout_ms)
    }

    pub fn explain_timeout(&self) -> Duration {
        Duration::from_millis(self.explain_timeout_ms)
    }
}

/// Builder for VocabConfig.
#[derive(Default)]
pub struct VocabConfigBuilder {
    config: VocabConfig,
}

impl VocabConfigBuilder {
    /// Set the data directory.
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.data_dir = dir.into();
        self
    }

    /// Set the database path.
    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.database_path = Some(path.into());
        self
    }

    /// Set the preference document path.
    pub fn preferences_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.preferences_path = Some(path.into());
        self
    }

    /// Set the legacy dataset path.
    pub fn legacy_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.legacy_data_path = Some(path.into());
        self
    }

    /// Set the word list path.
    pub fn word_list_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.word_list_path = Some(path.into());
        self
    }

    /// Set the store open timeout.
    pub fn open_timeout(mut self, timeout: Duration) -> Self {
        self.config.open_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the explainer call timeout.
    pub fn explain_timeout(mut self, timeout: Duration) -> Self {
        self.config.explain_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the remote sync source.
    pub fn remote_sync_url(mut self, url: impl Into<String>) -> Self {
        self.config.remote_sync_url = Some(url.into());
        self
    }

    /// Set reconciliation settings.
    pub fn reconcile(mut self, reconcile: ReconcileConfig) -> Self {
        self.config.reconcile = reconcile;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> VocabConfig {
        self.config
    }
}
