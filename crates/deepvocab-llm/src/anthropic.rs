//! Anthropic (Claude) messages API explainer.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use deepvocab_core::config::Settings;
use deepvocab_core::error::{VocabError, VocabResult};
use deepvocab_core::{ExplainRequest, Explainer};

use crate::prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20240620";
const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 2048;

/// Explainer backed by the Anthropic messages API.
pub struct AnthropicExplainer {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: String,
    messages: Vec<AnthropicMessage>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorDetail,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorDetail {
    message: String,
}

impl AnthropicExplainer {
    /// Build from the user's settings; fails without an API key.
    pub fn new(settings: &Settings) -> VocabResult<Self> {
        let api_key = settings.api_key.trim();
        if api_key.is_empty() {
            return Err(VocabError::Configuration(
                "Anthropic API key not found. Set openai_api_key in settings.".to_string(),
            ));
        }

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "x-api-key",
            api_key
                .parse()
                .map_err(|_| VocabError::Configuration("Invalid API key format".to_string()))?,
        );
        headers.insert(
            "anthropic-version",
            ANTHROPIC_VERSION
                .parse()
                .map_err(|_| VocabError::Configuration("Invalid version header".to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| {
                VocabError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        let base_url = settings
            .base_url()
            .unwrap_or(ANTHROPIC_API_URL)
            .trim_end_matches('/')
            .to_string();

        // The shared model setting defaults to an OpenAI model name.
        let model = Some(settings.model.trim())
            .filter(|m| m.starts_with("claude"))
            .unwrap_or(DEFAULT_MODEL)
            .to_string();

        Ok(Self {
            client,
            base_url,
            model,
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/messages", self.base_url)
    }
}

#[async_trait]
impl Explainer for AnthropicExplainer {
    async fn explain(&self, request: &ExplainRequest) -> VocabResult<String> {
        let body = AnthropicRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            system: prompts::system_prompt(request),
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompts::user_prompt(request),
            }],
        };

        let response = self
            .client
            .post(self.messages_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| VocabError::network(format!("Anthropic API request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| VocabError::network(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<AnthropicError>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(VocabError::from_http_status(status.as_u16(), &message));
        }

        let parsed: AnthropicResponse = serde_json::from_str(&text)
            .map_err(|e| VocabError::explainer(format!("Failed to parse response: {}", e)))?;

        let content = parsed
            .content
            .into_iter()
            .filter(|c| c.content_type == "text")
            .filter_map(|c| c.text)
            .collect::<Vec<_>>()
            .join("");
        if content.is_empty() {
            return Err(VocabError::explainer("Anthropic returned no text content"));
        }

        debug!(model = %self.model, chars = content.len(), "Anthropic explanation received");
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings {
            api_key: "sk-ant".to_string(),
            ..Default::default()
        };
        let explainer = AnthropicExplainer::new(&settings).unwrap();
        assert_eq!(explainer.model_name(), DEFAULT_MODEL);
        assert_eq!(explainer.messages_url(), "https://api.anthropic.com/v1/messages");
    }

    #[test]
    fn test_custom_endpoint_and_model() {
        let settings = Settings {
            api_key: "sk-ant".to_string(),
            base_url: "http://localhost:9000/v1/".to_string(),
            model: "claude-3-haiku-20240307".to_string(),
            ..Default::default()
        };
        let explainer = AnthropicExplainer::new(&settings).unwrap();
        assert_eq!(explainer.model_name(), "claude-3-haiku-20240307");
        assert_eq!(explainer.messages_url(), "http://localhost:9000/v1/messages");
    }

    #[test]
    fn test_response_text_blocks() {
        let parsed: AnthropicResponse = serde_json::from_str(
            r####"{"content":[{"type":"text","text":"### run"},{"type":"tool_use"}]}"####,
        )
        .unwrap();
        assert_eq!(parsed.content.len(), 2);
        assert_eq!(parsed.content[0].text.as_deref(), Some("### run"));
    }
}
