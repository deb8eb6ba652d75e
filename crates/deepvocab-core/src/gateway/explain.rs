//! Explanation lookups: cache, remote, legacy, explainer, offline fallback.

use tracing::{debug, info, warn};

use super::words::find_entry;
use super::{basic_definition, QueryGateway};
use crate::api::{CheckCacheParams, CheckCacheReply, ExplainParams, ExplainResult, VerbsInput, SECTION_SEPARATOR};
use crate::config::Settings;
use crate::error::{VocabError, VocabResult};
use crate::images::resolve_image;
use crate::store::VocabStore;
use crate::traits::ExplainRequest;
use crate::types::{list_key, normalize_word, ExplanationRecord, QueryMode};

/// Answer for one single-mode word.
struct WordAnswer {
    content: Option<String>,
    image: Option<String>,
}

/// Where the returned content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Cache,
    Explainer,
    Offline,
    None,
}

impl QueryGateway {
    /// Explain one or more words.
    ///
    /// In `single` mode every word is answered independently and the request
    /// fails only when no word could be answered. In `list` mode the word set
    /// is explained as a whole.
    pub async fn explain(&self, params: ExplainParams) -> VocabResult<ExplainResult> {
        let words = params
            .verbs
            .as_ref()
            .map(VerbsInput::words)
            .unwrap_or_default();
        if words.is_empty() {
            return Err(VocabError::missing_field("verbs"));
        }

        let settings = self.settings()?;
        let store = self.read_store().await?;

        match params.mode {
            QueryMode::Single => self.explain_words(&store, &settings, &words, &params).await,
            QueryMode::List => self.explain_list(&store, &settings, words, &params).await,
        }
    }

    async fn explain_words(
        &self,
        store: &VocabStore,
        settings: &Settings,
        words: &[String],
        params: &ExplainParams,
    ) -> VocabResult<ExplainResult> {
        let mut sections = Vec::with_capacity(words.len());
        let mut result = ExplainResult::default();
        let mut first_error = None;

        for word in words {
            match self.explain_word(store, settings, word, params).await {
                Ok(answer) => {
                    sections.push(answer.content.unwrap_or_default());
                    if let Some(url) = answer.image {
                        result.images.insert(word.clone(), url);
                    }
                }
                Err(e) => {
                    warn!(word = %word, error = %e, "Could not explain word");
                    result.missing.push(word.clone());
                    first_error.get_or_insert(e);
                }
            }
        }

        if sections.is_empty() {
            if let Some(e) = first_error {
                return Err(e);
            }
        }
        result.result = sections.join(SECTION_SEPARATOR);
        Ok(result)
    }

    async fn explain_word(
        &self,
        store: &VocabStore,
        settings: &Settings,
        word: &str,
        params: &ExplainParams,
    ) -> VocabResult<WordAnswer> {
        let key = normalize_word(word);
        let storage_key = ExplanationRecord::storage_key(QueryMode::Single, &key);

        // Read even on refresh: a failed refresh falls back to it.
        let mut cached = read_cached(store, &storage_key);
        if cached.as_ref().and_then(ExplanationRecord::content_text).is_none() && !params.refresh {
            if let Some(record) = self.remote_lookup(store, &key).await {
                cached = Some(record);
            } else if let Some(record) = self.legacy_lookup(store, &key, cached.as_ref()) {
                cached = Some(record);
            }
        }

        let cached_content = cached
            .as_ref()
            .and_then(ExplanationRecord::content_text)
            .map(str::to_string);
        let image = resolve_image(settings, &key, cached.as_ref());
        let need_call = (params.refresh || cached_content.is_none()) && !params.only_images;

        let (content, source) = if !need_call {
            let source = if cached_content.is_some() { Source::Cache } else { Source::None };
            (cached_content.clone(), source)
        } else {
            let request = ExplainRequest::single(word).with_part_of_speech(params.pos.clone());
            match self.call_explainer(settings, &request).await {
                Ok(Some(text)) => (Some(text), Source::Explainer),
                Ok(None) if cached_content.is_some() => {
                    debug!(word = %key, "No credential; serving cached explanation");
                    (cached_content.clone(), Source::Cache)
                }
                Ok(None) => {
                    let fallback = self.offline_definition(word);
                    if fallback.is_none() {
                        return Err(VocabError::no_definition(word));
                    }
                    debug!(word = %key, "No credential; serving basic definition");
                    (fallback, Source::Offline)
                }
                Err(e) if cached_content.is_some() => {
                    warn!(word = %key, error = %e, "Explainer failed; serving cached explanation");
                    (cached_content.clone(), Source::Cache)
                }
                Err(e) => match self.offline_definition(word) {
                    Some(fallback) => {
                        warn!(word = %key, error = %e, "Explainer failed; serving basic definition");
                        (Some(fallback), Source::Offline)
                    }
                    None => return Err(e),
                },
            }
        };

        let image_changed = image != cached.as_ref().and_then(|c| c.image_url.clone());
        if source == Source::Explainer || image_changed {
            let to_save = if source == Source::Explainer {
                content.clone()
            } else {
                cached_content
            };
            if to_save.is_some() || params.only_images {
                let record = updated_record(cached, &key, to_save, image.clone(), source);
                if let Err(e) = store.put(&record) {
                    warn!(word = %key, error = %e, "Failed to update explanation cache");
                }
            }
        }

        Ok(WordAnswer { content, image })
    }

    async fn explain_list(
        &self,
        store: &VocabStore,
        settings: &Settings,
        words: Vec<String>,
        params: &ExplainParams,
    ) -> VocabResult<ExplainResult> {
        let key = list_key(&words);
        let storage_key = ExplanationRecord::storage_key(QueryMode::List, &key);
        let cached = read_cached(store, &storage_key);
        let cached_content = cached
            .as_ref()
            .and_then(ExplanationRecord::content_text)
            .map(str::to_string);

        if params.only_images || (!params.refresh && cached_content.is_some()) {
            return Ok(ExplainResult {
                result: cached_content.unwrap_or_default(),
                ..Default::default()
            });
        }

        let request = ExplainRequest::list(words).with_part_of_speech(params.pos.clone());
        let content = match self.call_explainer(settings, &request).await {
            Ok(Some(text)) => {
                let record = updated_record(cached, &key, Some(text.clone()), None, Source::Explainer);
                let record = ExplanationRecord {
                    mode: QueryMode::List,
                    ..record
                };
                if let Err(e) = store.put(&record) {
                    warn!(key = %key, error = %e, "Failed to update explanation cache");
                }
                text
            }
            Ok(None) => cached_content.ok_or_else(|| VocabError::no_definition(key.clone()))?,
            Err(e) => match cached_content {
                Some(stale) => {
                    warn!(key = %key, error = %e, "Explainer failed; serving cached comparison");
                    stale
                }
                None => return Err(e),
            },
        };

        Ok(ExplainResult {
            result: content,
            ..Default::default()
        })
    }

    /// Ask the explainer; `Ok(None)` when no credential is configured.
    async fn call_explainer(
        &self,
        settings: &Settings,
        request: &ExplainRequest,
    ) -> VocabResult<Option<String>> {
        let Some(explainer) = self.explainers.create(settings)? else {
            return Ok(None);
        };

        info!(words = %request.joined_words(), mode = %request.mode, model = explainer.model_name(), "Requesting explanation");
        let text = tokio::time::timeout(self.explain_timeout, explainer.explain(request))
            .await
            .map_err(|_| {
                VocabError::explainer_timeout(format!(
                    "explainer did not answer within {} ms",
                    self.explain_timeout.as_millis()
                ))
            })??;

        if text.trim().is_empty() {
            return Err(VocabError::explainer("explainer returned an empty explanation"));
        }
        Ok(Some(text))
    }

    async fn remote_lookup(&self, store: &VocabStore, key: &str) -> Option<ExplanationRecord> {
        let remote = self.remote.as_ref()?;
        match remote.fetch_single(key).await {
            Ok(Some(record)) if record.content_text().is_some() => {
                if let Err(e) = store.put(&record) {
                    warn!(word = %key, error = %e, "Failed to cache remote explanation");
                }
                debug!(word = %key, "Explanation found on remote");
                Some(record)
            }
            Ok(_) => None,
            Err(e) => {
                debug!(word = %key, error = %e, "Remote lookup failed");
                None
            }
        }
    }

    /// Legacy entry for `key`, persisted into the cache on the way out.
    fn legacy_lookup(
        &self,
        store: &VocabStore,
        key: &str,
        cached: Option<&ExplanationRecord>,
    ) -> Option<ExplanationRecord> {
        let value = self.bundled.legacy.lookup(key)?;
        let content = value.content().filter(|c| !c.trim().is_empty())?;

        let mut record = ExplanationRecord::new(QueryMode::Single, key, Some(content.to_string()))
            .with_image(
                cached
                    .and_then(|c| c.image_url.clone())
                    .or_else(|| value.image_url().map(str::to_string)),
            );
        record.image_dicebear = value.image_dicebear().map(str::to_string);
        record.image_pollinations = value.image_pollinations().map(str::to_string);

        if let Err(e) = store.put(&record) {
            warn!(word = %key, error = %e, "Failed to cache legacy explanation");
        }
        debug!(word = %key, "Explanation found in legacy data");
        Some(record)
    }

    fn offline_definition(&self, word: &str) -> Option<String> {
        let dictionary = self.dictionary();
        find_entry(&dictionary, word).map(basic_definition)
    }

    /// Which queries already have cached explanations.
    ///
    /// A list of words returns the normalized words that hit the single-mode
    /// cache; one query string returns whether it hits in the given mode.
    pub async fn check_cache(&self, params: CheckCacheParams) -> VocabResult<CheckCacheReply> {
        let store = self.read_store().await?;
        let has_content = |mode: QueryMode, key: &str| {
            read_cached(&store, &ExplanationRecord::storage_key(mode, key))
                .map(|r| r.content_text().is_some())
                .unwrap_or(false)
        };

        match params.verbs {
            VerbsInput::List(words) => Ok(CheckCacheReply::Hits(
                words
                    .iter()
                    .map(|w| normalize_word(w))
                    .filter(|key| !key.is_empty() && has_content(QueryMode::Single, key))
                    .collect(),
            )),
            VerbsInput::Text(text) => {
                let mode = params.mode.unwrap_or_default();
                let key = mode.normalize(&text);
                if key.is_empty() {
                    return Err(VocabError::missing_field("verbs"));
                }
                Ok(CheckCacheReply::Single {
                    cached: has_content(mode, &key),
                })
            }
        }
    }
}

/// Cache read on a read path: failures are logged and treated as a miss.
fn read_cached(store: &VocabStore, storage_key: &str) -> Option<ExplanationRecord> {
    store.get::<ExplanationRecord>(storage_key).unwrap_or_else(|e| {
        warn!(key = %storage_key, error = %e, "Cache read failed; treating as miss");
        None
    })
}

/// Upsert payload keeping whatever the cached record already carries.
fn updated_record(
    cached: Option<ExplanationRecord>,
    key: &str,
    content: Option<String>,
    image: Option<String>,
    source: Source,
) -> ExplanationRecord {
    match cached {
        Some(mut record) => {
            record.content = content.or(record.content);
            record.image_url = image;
            if source == Source::Explainer {
                record.created_at = chrono::Utc::now();
            }
            record
        }
        None => ExplanationRecord::new(QueryMode::Single, key, content).with_image(image),
    }
}

