//! Settings endpoints.

use axum::{extract::State, Json};
use deepvocab_core::{Settings, SettingsPatch};

use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/settings
pub async fn get_settings(State(state): State<AppState>) -> ApiResult<Json<Settings>> {
    Ok(Json(state.gateway.settings()?))
}

/// Merge a partial update and return the merged settings.
/// POST /api/settings
pub async fn update_settings(
    State(state): State<AppState>,
    Json(patch): Json<SettingsPatch>,
) -> ApiResult<Json<Settings>> {
    Ok(Json(state.gateway.update_settings(patch)?))
}
