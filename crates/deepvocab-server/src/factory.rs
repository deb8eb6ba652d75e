//! Builds the gateway from configuration.

use std::path::Path;
use std::sync::Arc;

use deepvocab_core::error::VocabResult;
use deepvocab_core::{QueryGateway, VocabConfig};
use deepvocab_llm::LlmExplainerFactory;
use tracing::info;

/// Configuration from the file named by `DEEPVOCAB_CONFIG`, else from the
/// `DEEPVOCAB_*` environment variables.
pub fn load_config() -> VocabResult<VocabConfig> {
    match std::env::var("DEEPVOCAB_CONFIG") {
        Ok(path) if !path.trim().is_empty() => {
            info!(path = %path, "Loading configuration file");
            VocabConfig::from_file(Path::new(path.trim()))
        }
        _ => Ok(VocabConfig::from_env()),
    }
}

/// Open a gateway whose explainer follows the user's LLM settings.
pub async fn create_gateway(config: &VocabConfig) -> VocabResult<QueryGateway> {
    info!(data_dir = %config.data_dir.display(), "Opening deepvocab gateway");
    QueryGateway::open(config, Arc::new(LlmExplainerFactory::new())).await
}
