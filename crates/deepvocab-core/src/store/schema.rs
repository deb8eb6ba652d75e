//! SQLite schema for the vocabulary store.
//!
//! The schema version lives in `PRAGMA user_version`. There is no in-place
//! migration path: a database written with another version, or whose
//! collection tables have another shape, is reported as incompatible and the
//! caller decides whether to recreate it.

use rusqlite::Connection;
use thiserror::Error;

use super::Collection;
use crate::error::VocabError;

/// Current schema version.
pub const SCHEMA_VERSION: i64 = 6;

/// Columns every collection table must have.
const COLLECTION_COLUMNS: [&str; 3] = ["key", "payload", "updated_at"];

/// Why an existing database cannot be opened with the current schema.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Stored schema version differs from [`SCHEMA_VERSION`].
    #[error("schema version {found} is incompatible with {expected}")]
    VersionMismatch { found: i64, expected: i64 },

    /// A collection table exists with an unexpected shape.
    #[error("table '{table}' has an incompatible layout")]
    TableLayout { table: String },

    /// The file is not a readable SQLite database.
    #[error("database file is corrupt: {0}")]
    Corrupt(String),

    /// Any other failure while opening (busy, IO, ...).
    #[error(transparent)]
    Open(#[from] VocabError),
}

impl SchemaError {
    /// Whether recreating the store would resolve the failure.
    pub fn is_incompatible(&self) -> bool {
        !matches!(self, SchemaError::Open(_))
    }
}

impl From<rusqlite::Error> for SchemaError {
    fn from(err: rusqlite::Error) -> Self {
        match VocabError::from(err) {
            VocabError::StoreCorrupt { message, .. } => SchemaError::Corrupt(message),
            other => SchemaError::Open(other),
        }
    }
}

impl From<SchemaError> for VocabError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::Open(inner) => inner,
            other => VocabError::schema_mismatch(other.to_string()),
        }
    }
}

/// DDL for every collection table.
fn schema_sql() -> String {
    let mut sql = String::new();
    for collection in Collection::ALL {
        sql.push_str(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                key        TEXT PRIMARY KEY,
                payload    TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );\n",
            table = collection.table()
        ));
    }
    sql.push_str(
        "CREATE INDEX IF NOT EXISTS idx_review_states_updated_at ON review_states(updated_at);\n",
    );
    sql
}

/// Check the stored schema and create it on a fresh database.
pub(crate) fn ensure_schema(conn: &Connection) -> Result<(), SchemaError> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if version != 0 && version != SCHEMA_VERSION {
        return Err(SchemaError::VersionMismatch {
            found: version,
            expected: SCHEMA_VERSION,
        });
    }

    // Version 0 with pre-existing tables means a database from an
    // unversioned build; only accept it if every table already fits.
    for collection in Collection::ALL {
        let columns = table_columns(conn, collection.table())?;
        if !columns.is_empty()
            && !COLLECTION_COLUMNS
                .iter()
                .all(|c| columns.iter().any(|existing| existing == c))
        {
            return Err(SchemaError::TableLayout {
                table: collection.table().to_string(),
            });
        }
    }

    if version == 0 {
        conn.execute_batch(&schema_sql())?;
        conn.execute_batch(&format!("PRAGMA user_version = {};", SCHEMA_VERSION))?;
    }

    Ok(())
}

fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>, rusqlite::Error> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
    let columns = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_database_gets_current_version() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        let version: i64 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);

        // Idempotent on reopen.
        ensure_schema(&conn).unwrap();
    }

    #[test]
    fn test_version_mismatch_detected() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA user_version = 5;").unwrap();
        let err = ensure_schema(&conn).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::VersionMismatch {
                found: 5,
                expected: SCHEMA_VERSION
            }
        ));
        assert!(err.is_incompatible());
    }

    #[test]
    fn test_foreign_table_layout_detected() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE explanations (mode TEXT, query_key TEXT, content TEXT,
             PRIMARY KEY (mode, query_key));",
        )
        .unwrap();
        let err = ensure_schema(&conn).unwrap_err();
        assert!(matches!(err, SchemaError::TableLayout { ref table } if table == "explanations"));
    }

    #[test]
    fn test_schema_error_converts_to_store_corrupt() {
        let err: VocabError = SchemaError::VersionMismatch {
            found: 1,
            expected: SCHEMA_VERSION,
        }
        .into();
        assert!(err.is_schema_incompatible());
    }
}
