//! Error handling for the HTTP API server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use deepvocab_core::error::VocabError;
use serde::Serialize;
use std::fmt;

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.status, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<VocabError> for ApiError {
    fn from(err: VocabError) -> Self {
        let status = match &err {
            VocabError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            VocabError::NoDefinitionAvailable { .. } => StatusCode::NOT_FOUND,
            VocabError::StoreBusy { .. } => StatusCode::SERVICE_UNAVAILABLE,
            VocabError::Explainer { .. } | VocabError::Network { .. } => StatusCode::BAD_GATEWAY,
            VocabError::Configuration(_) | VocabError::UnsupportedProvider { .. } => {
                StatusCode::BAD_REQUEST
            }
            VocabError::StoreCorrupt { .. }
            | VocabError::Database { .. }
            | VocabError::Io(_)
            | VocabError::Serialization(_)
            | VocabError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let api = ApiError::new(status, err.code().as_str(), err.to_string());
        match err.suggestion() {
            Some(suggestion) => api.with_details(serde_json::json!({ "suggestion": suggestion })),
            None => api,
        }
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
