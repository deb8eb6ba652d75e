//! Route definitions for the REST API.

mod backup;
mod explain;
mod health;
mod journal;
mod review;
mod settings;
mod words;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Settings
        .route(
            "/api/settings",
            get(settings::get_settings).post(settings::update_settings),
        )
        // Explanations
        .route("/api/explain", post(explain::explain))
        .route("/api/check_cache", post(explain::check_cache))
        // Review schedule
        .route("/api/ebbinghaus/record", post(review::record_review))
        .route("/api/mastery", post(review::mark_mastered))
        .route("/api/ebbinghaus/due", get(review::due_reviews))
        .route("/api/ebbinghaus/status", get(review::review_status))
        .route("/api/ebbinghaus/reset", post(review::reset_word))
        .route("/api/ebbinghaus/clear_all", post(backup::clear_all))
        // Check-ins and learn batch
        .route(
            "/api/checkins",
            get(journal::list_checkins).post(journal::add_checkin),
        )
        .route("/api/checkins/delete", post(journal::delete_checkin))
        .route(
            "/api/learn_batch",
            get(journal::list_batch).post(journal::add_to_batch),
        )
        .route("/api/learn_batch/remove", post(journal::remove_from_batch))
        // Words
        .route("/api/verbs", get(words::list_words))
        .route(
            "/api/exclude",
            get(words::list_excluded).post(words::update_excluded),
        )
        .route("/api/image/:word", get(words::image))
        .route("/api/stats/daily_goal", get(words::daily_goal))
        // Backup
        .route("/api/export", get(backup::export))
        .route("/api/import", post(backup::import))
        // Attach state
        .with_state(state)
}

pub use health::HealthResponse;
pub use words::WordListQuery;
