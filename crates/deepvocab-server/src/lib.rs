//! deepvocab-server - HTTP API server for deepvocab.
//!
//! Every [`QueryGateway`](deepvocab_core::QueryGateway) operation is exposed
//! as a JSON endpoint under `/api`.
//!
//! # Example
//!
//! ```ignore
//! use deepvocab_server::{create_server, AppState};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = deepvocab_core::VocabConfig::from_env();
//!     let state = AppState::from_config(&config).await.unwrap();
//!     let app = create_server(state);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod error;
pub mod factory;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use factory::{create_gateway, load_config};
pub use state::AppState;

use axum::{middleware as axum_middleware, Router};
use tower_http::trace::TraceLayer;

/// Create the server with all routes and middleware.
pub fn create_server(state: AppState) -> Router {
    routes::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors_layer(&middleware::cors_origins_from_env()))
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
}
