//! Word list, exclusion, image and statistics endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use deepvocab_core::api::{DailyGoalStats, ExcludeParams, ImageReply, WordList};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct WordListQuery {
    pub limit: Option<usize>,
}

/// GET /api/verbs?limit=
pub async fn list_words(
    State(state): State<AppState>,
    Query(query): Query<WordListQuery>,
) -> ApiResult<Json<WordList>> {
    Ok(Json(state.gateway.list_words(query.limit).await?))
}

/// GET /api/exclude
pub async fn list_excluded(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.gateway.excluded()?))
}

/// Add or remove one excluded word and return the new list.
/// POST /api/exclude
pub async fn update_excluded(
    State(state): State<AppState>,
    Json(params): Json<ExcludeParams>,
) -> ApiResult<Json<Vec<String>>> {
    let excluded = match params.verb.as_deref() {
        Some(verb) => state.gateway.set_excluded(verb, params.exclude)?,
        None => state.gateway.excluded()?,
    };
    Ok(Json(excluded))
}

/// GET /api/image/:word
pub async fn image(
    State(state): State<AppState>,
    Path(word): Path<String>,
) -> ApiResult<Json<ImageReply>> {
    Ok(Json(state.gateway.image(&word).await?))
}

/// GET /api/stats/daily_goal
pub async fn daily_goal(State(state): State<AppState>) -> ApiResult<Json<DailyGoalStats>> {
    Ok(Json(state.gateway.daily_goal().await?))
}
