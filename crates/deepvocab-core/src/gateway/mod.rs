//! The request gateway.
//!
//! [`QueryGateway`] is the single entry point for every named operation. It
//! owns the store provider, the preference store, the bundled reference data
//! and the explainer factory, and makes sure reconciliation has run before
//! the first request touches the store.

mod backup;
mod explain;
mod progress;
mod words;

pub use backup::{ImportParams, ImportedProgress, Snapshot, SnapshotImport};
pub use words::basic_definition;

use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::{DailyGoalStats, ImageReply};
use crate::bundled::BundledData;
use crate::config::{PreferenceStore, Settings, SettingsPatch, VocabConfig};
use crate::error::{VocabError, VocabResult};
use crate::images;
use crate::reconcile::{ReconcileReport, ReconciliationEngine};
use crate::review::{local_midnight, ReviewTracker};
use crate::store::{StoreProvider, VocabStore};
use crate::sync::HttpRemoteSource;
use crate::traits::{ExplainerFactory, NoExplainer, RemoteSource};
use crate::types::{normalize_word, DictionaryEntry, ExplanationRecord, QueryMode};

/// Answers the named operations of the request surface.
pub struct QueryGateway {
    provider: StoreProvider,
    prefs: PreferenceStore,
    bundled: BundledData,
    engine: ReconciliationEngine,
    reviews: ReviewTracker,
    explainers: Arc<dyn ExplainerFactory>,
    remote: Option<Arc<dyn RemoteSource>>,
    explain_timeout: Duration,
    /// Word list served to readers; replaced wholesale, never mutated.
    dictionary: RwLock<Arc<Vec<DictionaryEntry>>>,
    /// Set once the store has been reconciled for this process.
    reconciled: Mutex<bool>,
}

impl QueryGateway {
    /// Open a gateway from configuration: preferences and bundled data from
    /// disk, a lazily opened store, and the optional remote source.
    pub async fn open(
        config: &VocabConfig,
        explainers: Arc<dyn ExplainerFactory>,
    ) -> VocabResult<Self> {
        config.validate()?;

        let prefs = PreferenceStore::load(config.preferences_file())?;
        let bundled =
            BundledData::load(&config.legacy_data_file(), &config.word_list_file()).await;

        let mut builder = Self::builder()
            .provider(StoreProvider::new(
                config.database_file(),
                config.open_timeout(),
            ))
            .preferences(prefs)
            .bundled(bundled)
            .engine(ReconciliationEngine::new(config.reconcile.clone()))
            .explainer_factory(explainers)
            .explain_timeout(config.explain_timeout());

        if let Some(url) = &config.remote_sync_url {
            info!(url = %url, "Remote sync source enabled");
            builder = builder.remote(Arc::new(HttpRemoteSource::new(
                url,
                config.explain_timeout(),
            )?));
        }

        Ok(builder.build())
    }

    pub fn builder() -> QueryGatewayBuilder {
        QueryGatewayBuilder::default()
    }

    /// The durable store, reconciled on first use.
    ///
    /// Concurrent first callers wait for one reconciliation. A reconciliation
    /// failure is logged and does not fail the request; a transient one is
    /// retried by the next caller.
    pub async fn ensure_ready(&self) -> VocabResult<VocabStore> {
        let store = self.provider.handle().await?;

        let mut reconciled = self.reconciled.lock().await;
        if !*reconciled {
            self.pull_remote(&store).await;
            match self.engine.run(&store, &self.prefs, &self.bundled) {
                Ok(report) => {
                    debug!(?report, "Store reconciled");
                    *reconciled = true;
                }
                Err(e) if e.is_recoverable() => {
                    warn!(error = %e, "Reconciliation failed; will retry");
                }
                Err(e) => {
                    warn!(error = %e, "Reconciliation skipped");
                    *reconciled = true;
                }
            }
            self.reload_dictionary(&store);
        }

        Ok(store)
    }

    /// Run reconciliation now and report what it did.
    pub async fn reconcile(&self) -> VocabResult<ReconcileReport> {
        let store = self.provider.handle().await?;
        let mut reconciled = self.reconciled.lock().await;
        let report = self.engine.run(&store, &self.prefs, &self.bundled)?;
        *reconciled = true;
        self.reload_dictionary(&store);
        Ok(report)
    }

    /// Store for read paths: the durable one, or an in-memory fallback
    /// while it is busy.
    async fn read_store(&self) -> VocabResult<VocabStore> {
        match self.ensure_ready().await {
            Ok(store) => Ok(store),
            Err(VocabError::StoreBusy { .. }) => self.provider.read_handle().await,
            Err(e) => Err(e),
        }
    }

    /// Make the next request reconcile again.
    async fn rearm(&self) {
        *self.reconciled.lock().await = false;
    }

    async fn pull_remote(&self, store: &VocabStore) {
        let Some(remote) = &self.remote else {
            return;
        };
        match remote.fetch_all().await {
            Ok(records) if records.is_empty() => {}
            Ok(records) => match store.bulk_put(&records) {
                Ok(count) => info!(count, "Synced explanations from remote"),
                Err(e) => warn!(error = %e, "Failed to store remote explanations"),
            },
            Err(e) => warn!(error = %e, "Remote sync unavailable"),
        }
    }

    fn reload_dictionary(&self, store: &VocabStore) {
        let entries = match store.all::<DictionaryEntry>() {
            Ok(mut entries) if !entries.is_empty() => {
                entries.sort_by_key(|e| e.sequence);
                entries
            }
            Ok(_) => self.bundled.word_list.as_ref().clone(),
            Err(e) => {
                warn!(error = %e, "Failed to load dictionary; using bundled list");
                self.bundled.word_list.as_ref().clone()
            }
        };
        match self.dictionary.write() {
            Ok(mut guard) => *guard = Arc::new(entries),
            Err(e) => warn!(error = %e, "Dictionary cache lock poisoned"),
        }
    }

    /// Whether the durable store has been opened.
    pub fn is_store_ready(&self) -> bool {
        self.provider.is_ready()
    }

    /// Current word list snapshot.
    pub fn dictionary(&self) -> Arc<Vec<DictionaryEntry>> {
        match self.dictionary.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(_) => Arc::clone(&self.bundled.word_list),
        }
    }

    pub fn preferences(&self) -> &PreferenceStore {
        &self.prefs
    }

    pub fn settings(&self) -> VocabResult<Settings> {
        self.prefs.settings()
    }

    /// Merge a partial settings update and return the merged settings.
    pub fn update_settings(&self, patch: SettingsPatch) -> VocabResult<Settings> {
        let settings = self.prefs.update_settings(patch)?;
        debug!(image_provider = %settings.image_provider, "Settings updated");
        Ok(settings)
    }

    /// Excluded words, sorted.
    pub fn excluded(&self) -> VocabResult<Vec<String>> {
        self.prefs.excluded()
    }

    /// Add or remove one excluded word; returns the new list.
    pub fn set_excluded(&self, word: &str, exclude: bool) -> VocabResult<Vec<String>> {
        self.prefs.set_excluded(word, exclude)
    }

    /// Image URL for `word` under the current settings.
    ///
    /// Reuses a cached URL when it matches the configured provider.
    pub async fn image(&self, word: &str) -> VocabResult<ImageReply> {
        let key = normalize_word(word);
        if key.is_empty() {
            return Err(VocabError::missing_field("verb"));
        }
        let settings = self.settings()?;
        let cached = match self.read_store().await {
            Ok(store) => store
                .get::<ExplanationRecord>(&ExplanationRecord::storage_key(QueryMode::Single, &key))
                .unwrap_or_else(|e| {
                    warn!(error = %e, "Cache read failed");
                    None
                }),
            Err(e) => {
                warn!(error = %e, "Store unavailable for image lookup");
                None
            }
        };
        Ok(ImageReply {
            url: images::resolve_image(&settings, &key, cached.as_ref()),
        })
    }

    /// Daily goal and today's progress.
    pub async fn daily_goal(&self) -> VocabResult<DailyGoalStats> {
        let settings = self.settings()?;
        let store = self.read_store().await?;
        let now = chrono::Utc::now();
        let progress = self
            .reviews
            .daily_progress(&store, now, local_midnight(now))?;
        Ok(DailyGoalStats {
            daily_goal: settings.daily_goal,
            new_words_today: progress.new_today,
            due_words_remaining: progress.due,
        })
    }
}

/// Builder for [`QueryGateway`].
pub struct QueryGatewayBuilder {
    provider: Option<StoreProvider>,
    prefs: Option<PreferenceStore>,
    bundled: BundledData,
    engine: ReconciliationEngine,
    reviews: ReviewTracker,
    explainers: Arc<dyn ExplainerFactory>,
    remote: Option<Arc<dyn RemoteSource>>,
    explain_timeout: Duration,
}

impl Default for QueryGatewayBuilder {
    fn default() -> Self {
        Self {
            provider: None,
            prefs: None,
            bundled: BundledData::default(),
            engine: ReconciliationEngine::default(),
            reviews: ReviewTracker::default(),
            explainers: Arc::new(NoExplainer),
            remote: None,
            explain_timeout: Duration::from_secs(60),
        }
    }
}

impl QueryGatewayBuilder {
    /// Use an already opened store.
    pub fn store(mut self, store: VocabStore) -> Self {
        self.provider = Some(StoreProvider::from_store(store));
        self
    }

    pub fn provider(mut self, provider: StoreProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn preferences(mut self, prefs: PreferenceStore) -> Self {
        self.prefs = Some(prefs);
        self
    }

    pub fn bundled(mut self, bundled: BundledData) -> Self {
        self.bundled = bundled;
        self
    }

    pub fn engine(mut self, engine: ReconciliationEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn review_tracker(mut self, reviews: ReviewTracker) -> Self {
        self.reviews = reviews;
        self
    }

    pub fn explainer_factory(mut self, explainers: Arc<dyn ExplainerFactory>) -> Self {
        self.explainers = explainers;
        self
    }

    pub fn remote(mut self, remote: Arc<dyn RemoteSource>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn explain_timeout(mut self, timeout: Duration) -> Self {
        self.explain_timeout = timeout;
        self
    }

    pub fn build(self) -> QueryGateway {
        let dictionary = Arc::clone(&self.bundled.word_list);
        QueryGateway {
            provider: self.provider.unwrap_or_else(StoreProvider::in_memory),
            prefs: self.prefs.unwrap_or_else(PreferenceStore::in_memory),
            bundled: self.bundled,
            engine: self.engine,
            reviews: self.reviews,
            explainers: self.explainers,
            remote: self.remote,
            explain_timeout: self.explain_timeout,
            dictionary: RwLock::new(dictionary),
            reconciled: Mutex::new(false),
        }
    }
}
