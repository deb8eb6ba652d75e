//! Check-in and learn-batch endpoints.

use axum::{extract::State, Json};
use deepvocab_core::api::{BatchParams, CheckInParams, VerbParams};
use deepvocab_core::StatusReply;

use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/checkins
pub async fn list_checkins(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.gateway.checkins().await?))
}

/// Check in for a date; an empty body means today.
/// POST /api/checkins
pub async fn add_checkin(
    State(state): State<AppState>,
    params: Option<Json<CheckInParams>>,
) -> ApiResult<Json<StatusReply>> {
    let params = params.map(|Json(p)| p).unwrap_or_default();
    Ok(Json(state.gateway.add_checkin(params).await?))
}

/// POST /api/checkins/delete
pub async fn delete_checkin(
    State(state): State<AppState>,
    Json(params): Json<CheckInParams>,
) -> ApiResult<Json<StatusReply>> {
    Ok(Json(state.gateway.delete_checkin(params).await?))
}

/// GET /api/learn_batch
pub async fn list_batch(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.gateway.learn_batch().await?))
}

/// POST /api/learn_batch
pub async fn add_to_batch(
    State(state): State<AppState>,
    Json(params): Json<BatchParams>,
) -> ApiResult<Json<StatusReply>> {
    Ok(Json(state.gateway.add_to_batch(params).await?))
}

/// POST /api/learn_batch/remove
pub async fn remove_from_batch(
    State(state): State<AppState>,
    Json(params): Json<VerbParams>,
) -> ApiResult<Json<StatusReply>> {
    Ok(Json(state.gateway.remove_from_batch(params).await?))
}
