//! Durable key-indexed storage for the vocabulary collections.
//!
//! Provides a SQLite-backed store with one table per collection. Records are
//! kept as JSON payloads under a string key; the [`Record`] trait binds each
//! record type to its collection and key.

mod provider;
mod schema;

pub use provider::StoreProvider;
pub use schema::{SchemaError, SCHEMA_VERSION};

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use strum::Display;

use crate::error::{VocabError, VocabResult};
use crate::types::{BatchEntry, CheckIn, DictionaryEntry, ExplanationRecord, ReviewState};

/// How long SQLite waits on a locked database before reporting busy.
const BUSY_TIMEOUT: Duration = Duration::from_secs(2);

/// Named collections of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Collection {
    Explanations,
    ReviewStates,
    CheckIns,
    LearnBatch,
    Dictionary,
}

impl Collection {
    /// Every collection, in table-creation order.
    pub const ALL: [Collection; 5] = [
        Collection::Explanations,
        Collection::ReviewStates,
        Collection::CheckIns,
        Collection::LearnBatch,
        Collection::Dictionary,
    ];

    /// Backing table name.
    pub fn table(&self) -> &'static str {
        match self {
            Collection::Explanations => "explanations",
            Collection::ReviewStates => "review_states",
            Collection::CheckIns => "checkins",
            Collection::LearnBatch => "learn_batch",
            Collection::Dictionary => "dictionary",
        }
    }
}

/// A record stored in one collection under a string key.
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: Collection;

    /// Primary key within the collection.
    fn key(&self) -> String;
}

impl Record for ExplanationRecord {
    const COLLECTION: Collection = Collection::Explanations;

    fn key(&self) -> String {
        ExplanationRecord::storage_key(self.mode, &self.query_key)
    }
}

impl Record for ReviewState {
    const COLLECTION: Collection = Collection::ReviewStates;

    fn key(&self) -> String {
        self.word.clone()
    }
}

impl Record for CheckIn {
    const COLLECTION: Collection = Collection::CheckIns;

    fn key(&self) -> String {
        self.date.clone()
    }
}

impl Record for BatchEntry {
    const COLLECTION: Collection = Collection::LearnBatch;

    fn key(&self) -> String {
        self.verb.clone()
    }
}

impl Record for DictionaryEntry {
    const COLLECTION: Collection = Collection::Dictionary;

    fn key(&self) -> String {
        self.word.clone()
    }
}

/// SQLite-backed store for all vocabulary collections.
///
/// Cloning is cheap and shares the underlying connection.
#[derive(Clone, Debug)]
pub struct VocabStore {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl VocabStore {
    /// Open (or create) the store at `path`.
    ///
    /// Fails with [`SchemaError`] when the file holds an incompatible or
    /// corrupt database; see [`VocabStore::recreate`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(VocabError::from)?;
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        schema::ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path.to_path_buf()),
        })
    }

    /// Destroy the database at `path` and create a fresh one.
    ///
    /// All stored data is lost.
    pub fn recreate(path: impl AsRef<Path>) -> VocabResult<Self> {
        let path = path.as_ref();
        tracing::error!(
            path = %path.display(),
            "Recreating incompatible store; all stored data will be lost (data loss)"
        );

        for suffix in ["", "-wal", "-shm"] {
            let mut file = path.as_os_str().to_owned();
            file.push(suffix);
            match std::fs::remove_file(&file) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(Self::open(path)?)
    }

    /// Create an in-memory store (tests and degraded read paths).
    pub fn in_memory() -> VocabResult<Self> {
        let conn = Connection::open_in_memory()?;
        schema::ensure_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        })
    }

    /// On-disk location, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> VocabResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| VocabError::database(e.to_string()))
    }

    /// Get one record by key.
    pub fn get<R: Record>(&self, key: &str) -> VocabResult<Option<R>> {
        let conn = self.lock()?;
        let payload: Option<String> = conn
            .query_row(
                &format!("SELECT payload FROM {} WHERE key = ?1", R::COLLECTION.table()),
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Insert or replace one record.
    pub fn put<R: Record>(&self, record: &R) -> VocabResult<()> {
        let payload = serde_json::to_string(record)?;
        let conn = self.lock()?;
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO {} (key, payload, updated_at) VALUES (?1, ?2, ?3)",
                R::COLLECTION.table()
            ),
            params![record.key(), payload, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Delete one record. Returns whether a record was removed.
    pub fn delete<R: Record>(&self, key: &str) -> VocabResult<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            &format!("DELETE FROM {} WHERE key = ?1", R::COLLECTION.table()),
            params![key],
        )?;
        Ok(deleted > 0)
    }

    /// Insert or replace many records in one transaction.
    ///
    /// Either every record is written or none is.
    pub fn bulk_put<R: Record>(&self, records: &[R]) -> VocabResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT OR REPLACE INTO {} (key, payload, updated_at) VALUES (?1, ?2, ?3)",
                R::COLLECTION.table()
            ))?;
            for record in records {
                let payload = serde_json::to_string(record)?;
                stmt.execute(params![record.key(), payload, now])?;
            }
        }
        tx.commit()?;

        Ok(records.len())
    }

    /// Number of records in the collection of `R`.
    pub fn count<R: Record>(&self) -> VocabResult<usize> {
        self.count_collection(R::COLLECTION)
    }

    /// Number of records in a collection.
    pub fn count_collection(&self, collection: Collection) -> VocabResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", collection.table()),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// All records matching `predicate`, in key order.
    ///
    /// Rows whose payload no longer decodes are skipped and logged.
    pub fn scan<R, F>(&self, mut predicate: F) -> VocabResult<Vec<R>>
    where
        R: Record,
        F: FnMut(&R) -> bool,
    {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT key, payload FROM {} ORDER BY key",
            R::COLLECTION.table()
        ))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut records = Vec::new();
        for (key, payload) in rows {
            match serde_json::from_str::<R>(&payload) {
                Ok(record) if predicate(&record) => records.push(record),
                Ok(_) => {}
                Err(e) => tracing::warn!(
                    collection = %R::COLLECTION,
                    key = %key,
                    "Skipping undecodable record: {}",
                    e
                ),
            }
        }
        Ok(records)
    }

    /// Every record of the collection of `R`.
    pub fn all<R: Record>(&self) -> VocabResult<Vec<R>> {
        self.scan(|_: &R| true)
    }

    /// Every key of the collection of `R`, fetched in one pass.
    pub fn keys<R: Record>(&self) -> VocabResult<HashSet<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("SELECT key FROM {}", R::COLLECTION.table()))?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(keys)
    }

    /// Remove every record of the collection of `R`.
    pub fn clear<R: Record>(&self) -> VocabResult<usize> {
        self.clear_collection(R::COLLECTION)
    }

    /// Remove every record of a collection.
    pub fn clear_collection(&self, collection: Collection) -> VocabResult<usize> {
        let conn = self.lock()?;
        let removed = conn.execute(&format!("DELETE FROM {}", collection.table()), [])?;
        Ok(removed)
    }

    /// Remove every record of every collection.
    pub fn clear_all(&self) -> VocabResult<()> {
        for collection in Collection::ALL {
            self.clear_collection(collection)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{QueryMode, ReviewStatus};

    fn explanation(key: &str, content: &str) -> ExplanationRecord {
        ExplanationRecord::new(QueryMode::Single, key, Some(content.to_string()))
    }

    #[test]
    fn test_store_creation() {
        let store = VocabStore::in_memory().unwrap();
        assert_eq!(store.count::<ExplanationRecord>().unwrap(), 0);
        assert!(store.path().is_none());
    }

    #[test]
    fn test_put_and_get() {
        let store = VocabStore::in_memory().unwrap();
        store.put(&explanation("run", "to move fast")).unwrap();

        let key = ExplanationRecord::storage_key(QueryMode::Single, "run");
        let record: ExplanationRecord = store.get(&key).unwrap().unwrap();
        assert_eq!(record.content.as_deref(), Some("to move fast"));

        let list_key = ExplanationRecord::storage_key(QueryMode::List, "run");
        assert!(store.get::<ExplanationRecord>(&list_key).unwrap().is_none());
    }

    #[test]
    fn test_put_overwrites() {
        let store = VocabStore::in_memory().unwrap();
        store.put(&explanation("run", "first")).unwrap();
        store.put(&explanation("run", "second")).unwrap();

        assert_eq!(store.count::<ExplanationRecord>().unwrap(), 1);
        let record: ExplanationRecord = store.get("single|run").unwrap().unwrap();
        assert_eq!(record.content.as_deref(), Some("second"));
    }

    #[test]
    fn test_delete() {
        let store = VocabStore::in_memory().unwrap();
        store.put(&CheckIn::new("2024-01-01")).unwrap();

        assert!(store.delete::<CheckIn>("2024-01-01").unwrap());
        assert!(!store.delete::<CheckIn>("2024-01-01").unwrap());
        assert_eq!(store.count::<CheckIn>().unwrap(), 0);
    }

    #[test]
    fn test_bulk_put_keys_and_clear() {
        let store = VocabStore::in_memory().unwrap();
        let records = vec![explanation("a", "x"), explanation("b", "y")];
        assert_eq!(store.bulk_put(&records).unwrap(), 2);
        assert_eq!(store.bulk_put::<ExplanationRecord>(&[]).unwrap(), 0);

        let keys = store.keys::<ExplanationRecord>().unwrap();
        assert!(keys.contains("single|a"));
        assert!(keys.contains("single|b"));

        assert_eq!(store.clear::<ExplanationRecord>().unwrap(), 2);
        assert_eq!(store.count::<ExplanationRecord>().unwrap(), 0);
    }

    #[test]
    fn test_scan_with_predicate() {
        let store = VocabStore::in_memory().unwrap();
        let now = Utc::now();
        for (word, stage) in [("run", 2u8), ("swim", 9u8)] {
            store
                .put(&ReviewState {
                    word: word.to_string(),
                    stage,
                    last_review: now,
                    next_review: now,
                    status: ReviewStatus::for_stage(stage),
                    review_count: 1,
                })
                .unwrap();
        }

        let mastered: Vec<ReviewState> = store
            .scan(|s: &ReviewState| s.status == ReviewStatus::Mastered)
            .unwrap();
        assert_eq!(mastered.len(), 1);
        assert_eq!(mastered[0].word, "swim");
        assert_eq!(store.all::<ReviewState>().unwrap().len(), 2);
    }

    #[test]
    fn test_collections_are_independent() {
        let store = VocabStore::in_memory().unwrap();
        store.put(&BatchEntry::new("run")).unwrap();
        store.put(&CheckIn::new("2024-01-01")).unwrap();

        store.clear::<BatchEntry>().unwrap();
        assert_eq!(store.count::<BatchEntry>().unwrap(), 0);
        assert_eq!(store.count::<CheckIn>().unwrap(), 1);

        store.clear_all().unwrap();
        assert_eq!(store.count::<CheckIn>().unwrap(), 0);
    }

    #[test]
    fn test_dictionary_keys_are_case_sensitive() {
        let store = VocabStore::in_memory().unwrap();
        let entry = |word: &str| DictionaryEntry {
            word: word.to_string(),
            frequency: 1,
            part_of_speech: "noun".to_string(),
            definition: String::new(),
            alternative_spelling: None,
            sequence: 1,
            original_word: word.to_string(),
        };
        store.bulk_put(&[entry("May"), entry("may")]).unwrap();
        assert_eq!(store.count::<DictionaryEntry>().unwrap(), 2);
    }

    #[test]
    fn test_reopen_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("vocab.db");

        {
            let store = VocabStore::open(&path).unwrap();
            store.put(&CheckIn::new("2024-02-02")).unwrap();
        }

        let store = VocabStore::open(&path).unwrap();
        assert_eq!(store.count::<CheckIn>().unwrap(), 1);
        assert_eq!(store.path(), Some(path.as_path()));
    }

    #[test]
    fn test_incompatible_file_is_recreated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch("CREATE TABLE checkins (date TEXT PRIMARY KEY);")
                .unwrap();
        }

        let err = VocabStore::open(&path).err().unwrap();
        assert!(err.is_incompatible());

        let store = VocabStore::recreate(&path).unwrap();
        store.put(&CheckIn::new("2024-03-03")).unwrap();
        assert_eq!(store.count::<CheckIn>().unwrap(), 1);
    }
}
