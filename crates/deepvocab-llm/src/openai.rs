//! OpenAI-compatible chat completions explainer.

use async_trait::async_trait;
use tracing::debug;

use deepvocab_core::config::Settings;
use deepvocab_core::error::{VocabError, VocabResult};
use deepvocab_core::{ExplainRequest, Explainer};

#[cfg(feature = "openai")]
use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
        ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
    },
    Client,
};

use crate::prompts;

const DEFAULT_MODEL: &str = "gpt-4o";
const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 2048;

/// Explainer backed by any OpenAI-compatible endpoint.
pub struct OpenAiExplainer {
    #[cfg(feature = "openai")]
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiExplainer {
    /// Build from the user's settings; fails without an API key.
    pub fn new(settings: &Settings) -> VocabResult<Self> {
        let api_key = settings.api_key.trim();
        if api_key.is_empty() {
            return Err(VocabError::Configuration(
                "OpenAI API key not found. Set openai_api_key in settings.".to_string(),
            ));
        }

        #[cfg(feature = "openai")]
        let client = {
            let config = match settings.base_url() {
                Some(base_url) => OpenAIConfig::new()
                    .with_api_key(api_key)
                    .with_api_base(base_url.trim_end_matches('/')),
                None => OpenAIConfig::new().with_api_key(api_key),
            };
            Client::with_config(config)
        };

        let model = Some(settings.model.trim())
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MODEL)
            .to_string();

        Ok(Self {
            #[cfg(feature = "openai")]
            client,
            model,
        })
    }

    /// Reasoning models reject sampling parameters.
    fn is_reasoning_model(&self) -> bool {
        let model = self.model.to_lowercase();
        ["o1", "o3", "gpt-5"].iter().any(|m| model.contains(m))
    }
}

#[cfg(feature = "openai")]
fn map_openai_error(err: OpenAIError) -> VocabError {
    match err {
        OpenAIError::Reqwest(e) => VocabError::network(format!("OpenAI request failed: {}", e)),
        OpenAIError::ApiError(e) => VocabError::explainer(format!("OpenAI API error: {}", e.message)),
        other => VocabError::explainer(format!("OpenAI error: {}", other)),
    }
}

#[async_trait]
impl Explainer for OpenAiExplainer {
    #[cfg(feature = "openai")]
    async fn explain(&self, request: &ExplainRequest) -> VocabResult<String> {
        let messages = vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(prompts::system_prompt(
                    request,
                )),
                name: None,
            }),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(prompts::user_prompt(
                    request,
                )),
                name: None,
            }),
        ];

        let mut chat = CreateChatCompletionRequest {
            model: self.model.clone(),
            messages,
            ..Default::default()
        };
        if !self.is_reasoning_model() {
            chat.temperature = Some(TEMPERATURE);
            chat.max_tokens = Some(MAX_TOKENS);
        }

        let response = self
            .client
            .chat()
            .create(chat)
            .await
            .map_err(map_openai_error)?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| VocabError::explainer("No response choices returned"))?;

        debug!(model = %self.model, chars = content.len(), "OpenAI explanation received");
        Ok(content)
    }

    #[cfg(not(feature = "openai"))]
    async fn explain(&self, _request: &ExplainRequest) -> VocabResult<String> {
        Err(VocabError::Configuration(
            "OpenAI feature not enabled. Enable the 'openai' feature.".to_string(),
        ))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
