//! HTTP remote source speaking the sync endpoints of a deepvocab server.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::error::{VocabError, VocabResult};
use crate::traits::RemoteSource;
use crate::types::{ExplanationRecord, QueryMode};

const ALL_EXPLANATIONS_PATH: &str = "api/sync/all_explanations";
const EXPLAIN_PATH: &str = "api/explain";

/// Remote source backed by another deepvocab HTTP server.
pub struct HttpRemoteSource {
    client: Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct RemoteRecord {
    #[serde(default)]
    mode: QueryMode,
    query_key: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl RemoteRecord {
    fn into_record(self) -> ExplanationRecord {
        let mut record = ExplanationRecord::new(
            self.mode,
            self.mode.normalize(&self.query_key),
            self.content,
        )
        .with_image(self.image_url);
        if let Some(created_at) = self.created_at {
            record.created_at = created_at;
        }
        record
    }
}

#[derive(Debug, Default, Deserialize)]
struct RemoteExplainResponse {
    #[serde(default)]
    explanations: HashMap<String, String>,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    images: HashMap<String, String>,
}

impl RemoteExplainResponse {
    fn into_record(mut self, word: &str) -> Option<ExplanationRecord> {
        let content = self
            .explanations
            .remove(word)
            .or(self.result)
            .filter(|c| !c.trim().is_empty())?;
        let image = self
            .images
            .remove(word)
            .or_else(|| self.images.into_values().next());
        Some(ExplanationRecord::new(QueryMode::Single, word, Some(content)).with_image(image))
    }
}

impl HttpRemoteSource {
    /// Create a source for the server at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> VocabResult<Self> {
        let mut base_url = Url::parse(base_url).map_err(|e| {
            VocabError::Configuration(format!("Invalid remote sync URL '{}': {}", base_url, e))
        })?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VocabError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> VocabResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| VocabError::Configuration(format!("Invalid remote endpoint: {}", e)))
    }

    fn explain_url(&self, word: &str) -> VocabResult<Url> {
        let mut url = self.endpoint(EXPLAIN_PATH)?;
        url.query_pairs_mut()
            .append_pair("verbs", word)
            .append_pair("mode", "single");
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> VocabResult<T> {
        let response = self
            .client
            .get(url)
            .header("X-Bypass-Local", "true")
            .send()
            .await
            .map_err(|e| VocabError::network(format!("Remote sync request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| VocabError::network(format!("Failed to read remote response: {}", e)))?;

        if !status.is_success() {
            return Err(VocabError::from_http_status(status.as_u16(), &body));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl RemoteSource for HttpRemoteSource {
    async fn fetch_all(&self) -> VocabResult<Vec<ExplanationRecord>> {
        let records: Vec<RemoteRecord> = self.get_json(self.endpoint(ALL_EXPLANATIONS_PATH)?).await?;
        Ok(records
            .into_iter()
            .filter(|r| !r.query_key.trim().is_empty())
            .map(RemoteRecord::into_record)
            .collect())
    }

    async fn fetch_single(&self, word: &str) -> VocabResult<Option<ExplanationRecord>> {
        let response: RemoteExplainResponse = self.get_json(self.explain_url(word)?).await?;
        Ok(response.into_record(word))
    }
}
