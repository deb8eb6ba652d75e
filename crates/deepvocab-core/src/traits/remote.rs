//! Remote synchronization source trait.

use async_trait::async_trait;

use crate::error::VocabResult;
use crate::types::ExplanationRecord;

/// Best-effort source of explanations held by another device or server.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Every explanation the remote holds.
    async fn fetch_all(&self) -> VocabResult<Vec<ExplanationRecord>>;

    /// The remote explanation for one normalized word, if any.
    async fn fetch_single(&self, word: &str) -> VocabResult<Option<ExplanationRecord>>;
}
