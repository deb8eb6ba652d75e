//! Export, import and clear-all endpoints.

use axum::{extract::State, Json};
use deepvocab_core::api::ClearAllParams;
use deepvocab_core::gateway::ImportParams;
use deepvocab_core::{Snapshot, StatusReply};
use tracing::error;

use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/export
pub async fn export(State(state): State<AppState>) -> ApiResult<Json<Snapshot>> {
    Ok(Json(state.gateway.export().await?))
}

/// Replace all data with the posted snapshot.
/// POST /api/import
pub async fn import(
    State(state): State<AppState>,
    Json(params): Json<ImportParams>,
) -> ApiResult<Json<StatusReply>> {
    state.gateway.import(params).await.map(Json).map_err(|e| {
        error!(error = %e, "Import failed; the store may be left cleared");
        e.into()
    })
}

/// POST /api/ebbinghaus/clear_all
pub async fn clear_all(
    State(state): State<AppState>,
    params: Option<Json<ClearAllParams>>,
) -> ApiResult<Json<StatusReply>> {
    let params = params.map(|Json(p)| p).unwrap_or_default();
    Ok(Json(state.gateway.clear_all(params).await?))
}
