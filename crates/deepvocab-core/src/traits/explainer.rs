//! Explainer trait and related types.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::error::VocabResult;
use crate::types::QueryMode;

/// One explanation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainRequest {
    /// Words as the user typed them; one word in `single` mode.
    pub words: Vec<String>,
    pub mode: QueryMode,
    /// Part of speech hint used to pick the prompt (default: verb).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<String>,
}

impl ExplainRequest {
    /// Request for a single word.
    pub fn single(word: impl Into<String>) -> Self {
        Self {
            words: vec![word.into()],
            mode: QueryMode::Single,
            part_of_speech: None,
        }
    }

    /// Request comparing several words.
    pub fn list(words: Vec<String>) -> Self {
        Self {
            words,
            mode: QueryMode::List,
            part_of_speech: None,
        }
    }

    /// Set the part of speech hint.
    pub fn with_part_of_speech(mut self, pos: Option<String>) -> Self {
        self.part_of_speech = pos.filter(|p| !p.trim().is_empty());
        self
    }

    /// Words joined for display in prompts.
    pub fn joined_words(&self) -> String {
        self.words.join(", ")
    }
}

/// Produces explanation text for words. Treated as opaque by the gateway.
#[async_trait]
pub trait Explainer: Send + Sync {
    /// Generate markdown explanation text.
    async fn explain(&self, request: &ExplainRequest) -> VocabResult<String>;

    /// Model identifier, for logging.
    fn model_name(&self) -> &str;
}

/// Builds an explainer from the current settings.
///
/// Settings change at runtime, so the gateway asks for an explainer per
/// request instead of holding one.
pub trait ExplainerFactory: Send + Sync {
    /// `Ok(None)` when no credential is configured.
    fn create(&self, settings: &Settings) -> VocabResult<Option<Arc<dyn Explainer>>>;
}

/// Factory that always returns the same explainer.
pub struct StaticExplainerFactory {
    explainer: Arc<dyn Explainer>,
}

impl StaticExplainerFactory {
    pub fn new(explainer: Arc<dyn Explainer>) -> Self {
        Self { explainer }
    }
}

impl ExplainerFactory for StaticExplainerFactory {
    fn create(&self, settings: &Settings) -> VocabResult<Option<Arc<dyn Explainer>>> {
        if settings.has_credential() {
            Ok(Some(Arc::clone(&self.explainer)))
        } else {
            Ok(None)
        }
    }
}

/// Factory for deployments without any explainer.
pub struct NoExplainer;

impl ExplainerFactory for NoExplainer {
    fn create(&self, _settings: &Settings) -> VocabResult<Option<Arc<dyn Explainer>>> {
        Ok(None)
    }
}
