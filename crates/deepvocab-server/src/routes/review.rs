//! Ebbinghaus review endpoints.

use std::collections::BTreeMap;

use axum::{extract::State, Json};
use deepvocab_core::api::{ReviewParams, ReviewReply, VerbParams};
use deepvocab_core::{ReviewState, StatusReply};

use crate::error::ApiResult;
use crate::state::AppState;

/// POST /api/ebbinghaus/record
pub async fn record_review(
    State(state): State<AppState>,
    Json(params): Json<ReviewParams>,
) -> ApiResult<Json<ReviewReply>> {
    Ok(Json(state.gateway.record_review(params).await?))
}

/// POST /api/mastery
pub async fn mark_mastered(
    State(state): State<AppState>,
    Json(params): Json<VerbParams>,
) -> ApiResult<Json<ReviewReply>> {
    Ok(Json(state.gateway.mark_mastered(params).await?))
}

/// GET /api/ebbinghaus/due
pub async fn due_reviews(State(state): State<AppState>) -> ApiResult<Json<Vec<ReviewState>>> {
    Ok(Json(state.gateway.due_reviews().await?))
}

/// GET /api/ebbinghaus/status
pub async fn review_status(
    State(state): State<AppState>,
) -> ApiResult<Json<BTreeMap<String, ReviewState>>> {
    Ok(Json(state.gateway.review_status().await?))
}

/// POST /api/ebbinghaus/reset
pub async fn reset_word(
    State(state): State<AppState>,
    Json(params): Json<VerbParams>,
) -> ApiResult<Json<StatusReply>> {
    Ok(Json(state.gateway.reset_word(params).await?))
}
