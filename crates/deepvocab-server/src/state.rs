//! Server state.

use std::sync::Arc;

use deepvocab_core::error::VocabResult;
use deepvocab_core::{QueryGateway, VocabConfig};

use crate::factory::create_gateway;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<QueryGateway>,
}

impl AppState {
    pub fn new(gateway: QueryGateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }

    /// Open the gateway described by `config`.
    pub async fn from_config(config: &VocabConfig) -> VocabResult<Self> {
        Ok(Self::new(create_gateway(config).await?))
    }
}
