//! Lazy, single-flight access to the durable store.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::OnceCell;
use tracing::{debug, warn};

use super::VocabStore;
use crate::error::{VocabError, VocabResult};

/// Owns the process-wide store handle.
///
/// Concurrent callers of [`StoreProvider::handle`] share one in-flight open
/// and observe the same handle or the same failure. A failed open leaves the
/// provider uninitialized so a later call can try again.
pub struct StoreProvider {
    path: Option<PathBuf>,
    open_timeout: Duration,
    store: OnceCell<VocabStore>,
    fallback: OnceCell<VocabStore>,
}

impl StoreProvider {
    /// Provider for a file-backed store.
    pub fn new(path: impl Into<PathBuf>, open_timeout: Duration) -> Self {
        Self {
            path: Some(path.into()),
            open_timeout,
            store: OnceCell::new(),
            fallback: OnceCell::new(),
        }
    }

    /// Provider for a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            open_timeout: Duration::from_secs(2),
            store: OnceCell::new(),
            fallback: OnceCell::new(),
        }
    }

    /// Provider around an already opened store.
    pub fn from_store(store: VocabStore) -> Self {
        Self {
            path: store.path().map(|p| p.to_path_buf()),
            open_timeout: Duration::from_secs(2),
            store: OnceCell::new_with(Some(store)),
            fallback: OnceCell::new(),
        }
    }

    /// Whether the durable store has been opened.
    pub fn is_ready(&self) -> bool {
        self.store.initialized()
    }

    /// The durable store, opening it on first use.
    ///
    /// A busy or slow open is retried once before failing with
    /// [`VocabError::StoreBusy`].
    pub async fn handle(&self) -> VocabResult<VocabStore> {
        self.store
            .get_or_try_init(|| self.open_with_retry())
            .await
            .cloned()
    }

    /// A store for read paths.
    ///
    /// Falls back to an empty in-memory store when the durable one is busy.
    pub async fn read_handle(&self) -> VocabResult<VocabStore> {
        match self.handle().await {
            Ok(store) => Ok(store),
            Err(e @ VocabError::StoreBusy { .. }) => {
                warn!(error = %e, "Durable store busy; serving reads from in-memory fallback");
                self.fallback
                    .get_or_try_init(|| async { VocabStore::in_memory() })
                    .await
                    .cloned()
            }
            Err(e) => Err(e),
        }
    }

    async fn open_with_retry(&self) -> VocabResult<VocabStore> {
        match self.open_once().await {
            Err(VocabError::StoreBusy { message, .. }) => {
                warn!(%message, "Store open failed as busy; retrying once");
                self.open_once().await
            }
            result => result,
        }
    }

    async fn open_once(&self) -> VocabResult<VocabStore> {
        let Some(path) = self.path.clone() else {
            debug!("Opening in-memory store");
            return VocabStore::in_memory();
        };

        debug!(path = %path.display(), "Opening store");
        let task = tokio::task::spawn_blocking(move || match VocabStore::open(&path) {
            Ok(store) => Ok(store),
            Err(e) if e.is_incompatible() => {
                warn!(path = %path.display(), error = %e, "Store is incompatible with this version");
                VocabStore::recreate(&path)
            }
            Err(e) => Err(VocabError::from(e)),
        });

        match tokio::time::timeout(self.open_timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join)) => Err(VocabError::Internal(format!("store open task failed: {}", join))),
            Err(_) => Err(VocabError::store_timeout(format!(
                "store did not open within {} ms",
                self.open_timeout.as_millis()
            ))),
        }
    }
}
