//! deepvocab-llm - Explainer implementations for deepvocab.
//!
//! # Supported Providers
//!
//! - **OpenAI** (feature: `openai`) - any OpenAI-compatible chat completions endpoint
//! - **Anthropic** - Claude models over the messages API
//!
//! The provider, key, endpoint and model come from the user's
//! [`Settings`](deepvocab_core::Settings), so [`LlmExplainerFactory`] builds a
//! fresh explainer for every request.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use deepvocab_llm::LlmExplainerFactory;
//!
//! let gateway = QueryGateway::open(&config, Arc::new(LlmExplainerFactory::new())).await?;
//! ```

mod anthropic;
mod factory;
mod openai;
pub mod prompts;

pub use anthropic::AnthropicExplainer;
pub use factory::LlmExplainerFactory;
pub use openai::OpenAiExplainer;

// Re-export core types for convenience
pub use deepvocab_core::config::LlmProvider;
pub use deepvocab_core::{ExplainRequest, Explainer, ExplainerFactory};
