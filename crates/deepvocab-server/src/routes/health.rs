//! Liveness probe.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

/// Never touches the store; `store_ready` reports whether it has been opened.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub store_ready: bool,
    pub dictionary_words: usize,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        store_ready: state.gateway.is_store_ready(),
        dictionary_words: state.gateway.dictionary().len(),
    })
}
