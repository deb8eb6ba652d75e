//! Bulk (re)import of the static word list.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::error::VocabResult;
use crate::store::VocabStore;
use crate::types::DictionaryEntry;

/// Word-list entries with duplicate words removed (first occurrence wins).
pub(crate) fn distinct_entries(entries: &[DictionaryEntry]) -> Vec<DictionaryEntry> {
    let mut seen = HashSet::with_capacity(entries.len());
    entries
        .iter()
        .filter(|e| seen.insert(e.word.as_str()))
        .cloned()
        .collect()
}

/// Replace the stored dictionary with `entries` when it holds fewer than
/// `expected` words. Returns the number of words written.
pub fn import_dictionary(
    store: &VocabStore,
    entries: &[DictionaryEntry],
    expected: usize,
) -> VocabResult<usize> {
    let stored = store.count::<DictionaryEntry>()?;
    if stored >= expected {
        debug!(stored, expected, "Dictionary complete");
        return Ok(0);
    }

    if stored > 0 {
        info!(stored, expected, "Dictionary incomplete; clearing before reimport");
        store.clear::<DictionaryEntry>()?;
    }

    let written = store.bulk_put(entries)?;
    info!(written, "Imported dictionary");
    Ok(written)
}
