//! Non-destructive merge of the legacy dataset into the explanation cache.

use std::collections::HashSet;

use tracing::debug;

use crate::error::VocabResult;
use crate::store::VocabStore;
use crate::types::{normalize_legacy_key, ExplanationRecord, LegacyDataset, LegacyValue, QueryMode};

/// Counters for one explanation merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub inserted: usize,
    /// Keys already present in the store, left untouched.
    pub existing: usize,
    /// Entries whose content is too short to be worth caching.
    pub too_short: usize,
    /// Later entries colliding with an earlier one after normalization.
    pub duplicates: usize,
}

/// Legacy entries eligible for the cache, first occurrence per key.
pub(crate) fn eligible(legacy: &LegacyDataset, min_content_len: usize) -> Vec<ExplanationRecord> {
    stage(legacy, min_content_len, &HashSet::new()).0
}

fn to_record(key: String, value: &LegacyValue) -> ExplanationRecord {
    let mut record = ExplanationRecord::new(
        QueryMode::Single,
        key,
        value.content().map(str::to_string),
    )
    .with_image(value.image_url().map(str::to_string));
    record.image_dicebear = value.image_dicebear().map(str::to_string);
    record.image_pollinations = value.image_pollinations().map(str::to_string);
    record
}

fn stage(
    legacy: &LegacyDataset,
    min_content_len: usize,
    existing_keys: &HashSet<String>,
) -> (Vec<ExplanationRecord>, MergeOutcome) {
    let mut outcome = MergeOutcome::default();
    let mut staged = Vec::new();
    let mut seen = HashSet::new();

    for (raw_key, value) in legacy.iter() {
        let key = normalize_legacy_key(raw_key);
        if key.is_empty() {
            continue;
        }
        if existing_keys.contains(&ExplanationRecord::storage_key(QueryMode::Single, &key)) {
            outcome.existing += 1;
            continue;
        }
        let long_enough = value
            .content()
            .map(|c| c.chars().count() > min_content_len)
            .unwrap_or(false);
        if !long_enough {
            outcome.too_short += 1;
            continue;
        }
        if !seen.insert(key.clone()) {
            outcome.duplicates += 1;
            continue;
        }
        staged.push(to_record(key, value));
    }

    (staged, outcome)
}

/// Insert every eligible legacy entry whose key is absent from the store.
///
/// Existing records are never overwritten, whatever their content. All
/// inserts happen in one bulk write.
pub fn merge_explanations(
    store: &VocabStore,
    legacy: &LegacyDataset,
    min_content_len: usize,
) -> VocabResult<MergeOutcome> {
    let existing_keys = store.keys::<ExplanationRecord>()?;
    let (staged, mut outcome) = stage(legacy, min_content_len, &existing_keys);

    outcome.inserted = store.bulk_put(&staged)?;
    debug!(
        inserted = outcome.inserted,
        existing = outcome.existing,
        too_short = outcome.too_short,
        duplicates = outcome.duplicates,
        "Merged legacy explanations"
    );
    Ok(outcome)
}
