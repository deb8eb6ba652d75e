//! Explanation endpoints.

use axum::{extract::State, Json};
use deepvocab_core::api::{CheckCacheParams, CheckCacheReply};
use deepvocab_core::{ExplainParams, ExplainResult};

use crate::error::ApiResult;
use crate::state::AppState;

/// POST /api/explain
pub async fn explain(
    State(state): State<AppState>,
    Json(params): Json<ExplainParams>,
) -> ApiResult<Json<ExplainResult>> {
    Ok(Json(state.gateway.explain(params).await?))
}

/// POST /api/check_cache
pub async fn check_cache(
    State(state): State<AppState>,
    Json(params): Json<CheckCacheParams>,
) -> ApiResult<Json<CheckCacheReply>> {
    Ok(Json(state.gateway.check_cache(params).await?))
}
