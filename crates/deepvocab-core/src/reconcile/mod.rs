//! Reconciliation of bundled reference data into the store.
//!
//! Two independent passes bring the store up to date:
//!
//! - the legacy explanations are merged into the explanation cache without
//!   overwriting anything already cached;
//! - the static word list is (re)imported into the dictionary when the stored
//!   copy is incomplete.
//!
//! Both are guarded by markers in the [`PreferenceStore`] so a complete store
//! is left alone, and both converge to the same state after a partial failure.

mod dictionary;
mod explanations;

pub use dictionary::import_dictionary;
pub use explanations::{merge_explanations, MergeOutcome};

use serde::Serialize;
use tracing::{info, warn};

use crate::bundled::BundledData;
use crate::config::{PreferenceStore, ReconcileConfig};
use crate::error::{VocabError, VocabResult};
use crate::store::VocabStore;
use crate::types::{DictionaryEntry, ExplanationRecord};

/// What one reconciliation run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// The stored data version was older than the bundled one.
    pub version_bumped: bool,
    pub explanations_checked: bool,
    pub explanations_inserted: usize,
    pub dictionary_checked: bool,
    pub dictionary_inserted: usize,
}

impl ReconcileReport {
    /// Whether the run wrote anything.
    pub fn wrote(&self) -> bool {
        self.explanations_inserted > 0 || self.dictionary_inserted > 0
    }
}

/// Runs both reconciliation passes.
#[derive(Debug, Clone, Default)]
pub struct ReconciliationEngine {
    config: ReconcileConfig,
}

impl ReconciliationEngine {
    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Bring the store up to date with `data`.
    ///
    /// The markers are only advanced after both passes succeed, so a failed
    /// run is retried in full next time.
    pub fn run(
        &self,
        store: &VocabStore,
        prefs: &PreferenceStore,
        data: &BundledData,
    ) -> VocabResult<ReconcileReport> {
        let mut report = ReconcileReport::default();
        let stored_version = prefs.data_version()?;
        report.version_bumped =
            matches!(stored_version, Some(v) if v != self.config.data_version);

        if report.version_bumped {
            info!(
                from = ?stored_version,
                to = self.config.data_version,
                "Bundled data version changed; forcing refresh"
            );
            store.clear::<DictionaryEntry>()?;
        }

        let eligible = explanations::eligible(&data.legacy, self.config.min_content_len).len();
        let cached = store.count::<ExplanationRecord>()?;
        if !prefs.legacy_imported()? || report.version_bumped || cached < eligible {
            report.explanations_checked = true;
            let outcome =
                merge_explanations(store, &data.legacy, self.config.min_content_len)?;
            report.explanations_inserted = outcome.inserted;
        }

        let entries = dictionary::distinct_entries(&data.word_list);
        if entries.is_empty() {
            if store.count::<DictionaryEntry>()? == 0 {
                return Err(VocabError::missing_field("word_list"));
            }
        } else {
            if entries.len() != self.config.expected_dictionary_size {
                warn!(
                    bundled = entries.len(),
                    expected = self.config.expected_dictionary_size,
                    "Bundled word list size differs from the expected size"
                );
            }
            report.dictionary_checked = true;
            report.dictionary_inserted = import_dictionary(store, &entries, entries.len())?;
        }

        prefs.set_legacy_imported(true)?;
        prefs.set_data_version(self.config.data_version)?;

        if report.wrote() {
            info!(
                explanations = report.explanations_inserted,
                dictionary = report.dictionary_inserted,
                "Reconciliation complete"
            );
        }
        Ok(report)
    }
}
