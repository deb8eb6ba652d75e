//! Factory for building explainers from settings.

use std::sync::Arc;

use tracing::debug;

use deepvocab_core::config::{LlmProvider, Settings};
use deepvocab_core::error::VocabResult;
use deepvocab_core::{Explainer, ExplainerFactory};

use crate::anthropic::AnthropicExplainer;
use crate::openai::OpenAiExplainer;

/// Builds the explainer for the configured provider on each request.
#[derive(Debug, Clone, Copy, Default)]
pub struct LlmExplainerFactory;

impl LlmExplainerFactory {
    pub fn new() -> Self {
        Self
    }

    /// Create an explainer for `provider` regardless of the configured one.
    pub fn create_for(provider: LlmProvider, settings: &Settings) -> VocabResult<Arc<dyn Explainer>> {
        debug!(%provider, "Creating explainer");
        match provider {
            LlmProvider::OpenAI => Ok(Arc::new(OpenAiExplainer::new(settings)?)),
            LlmProvider::Anthropic => Ok(Arc::new(AnthropicExplainer::new(settings)?)),
        }
    }
}

impl ExplainerFactory for LlmExplainerFactory {
    fn create(&self, settings: &Settings) -> VocabResult<Option<Arc<dyn Explainer>>> {
        if !settings.has_credential() {
            return Ok(None);
        }
        Self::create_for(settings.llm_provider, settings).map(Some)
    }
}
