//! Error types for deepvocab operations.
//!
//! This module provides the error hierarchy shared by every crate in the
//! workspace, with structured error codes and suggestions for resolution.
//! The gateway decides per variant whether a fallback exists; see
//! [`VocabError::is_recoverable`].

use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for deepvocab operations.
pub type VocabResult<T> = Result<T, VocabError>;

/// Main error type for all deepvocab operations.
#[derive(Error, Debug)]
pub enum VocabError {
    /// Input validation failed (missing word list, empty verb, ...).
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        code: ErrorCode,
        details: HashMap<String, String>,
        suggestion: Option<String>,
    },

    /// The store is held by another process or did not open in time.
    #[error("Store busy: {message}")]
    StoreBusy { message: String, code: ErrorCode },

    /// The on-disk store is corrupt or uses an incompatible schema.
    #[error("Store corrupt: {message}")]
    StoreCorrupt { message: String, code: ErrorCode },

    /// Database operation failed.
    #[error("Database error: {message}")]
    Database {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The explainer produced no usable explanation.
    #[error("Explainer error: {message}")]
    Explainer {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Network error (explainer transport or remote sync).
    #[error("Network error: {message}")]
    Network {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Neither cache, legacy data, explainer nor dictionary could answer.
    #[error("No definition available for '{word}'")]
    NoDefinitionAvailable { word: String, code: ErrorCode },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Provider not supported.
    #[error("Provider not supported: {provider}")]
    UnsupportedProvider { provider: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Validation (VAL_xxx)
    ValInvalidInput,
    ValMissingField,

    // Store (STORE_xxx)
    StoreBusy,
    StoreTimeout,
    StoreSchemaMismatch,
    StoreCorrupted,

    // Database (DB_xxx)
    DbOperationFailed,

    // Explainer (EXP_xxx)
    ExpGenerationFailed,
    ExpInvalidResponse,
    ExpTimeout,

    // Network (NET_xxx)
    NetTimeout,
    NetConnectionFailed,

    // Definitions (DEF_xxx)
    DefNotFound,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValInvalidInput => "VAL_001",
            ErrorCode::ValMissingField => "VAL_002",
            ErrorCode::StoreBusy => "STORE_001",
            ErrorCode::StoreTimeout => "STORE_002",
            ErrorCode::StoreSchemaMismatch => "STORE_003",
            ErrorCode::StoreCorrupted => "STORE_004",
            ErrorCode::DbOperationFailed => "DB_001",
            ErrorCode::ExpGenerationFailed => "EXP_001",
            ErrorCode::ExpInvalidResponse => "EXP_002",
            ErrorCode::ExpTimeout => "EXP_003",
            ErrorCode::NetTimeout => "NET_001",
            ErrorCode::NetConnectionFailed => "NET_002",
            ErrorCode::DefNotFound => "DEF_001",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl VocabError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            details: HashMap::new(),
            suggestion: None,
        }
    }

    /// Create a validation error for a missing request field.
    pub fn missing_field(field: &str) -> Self {
        Self::Validation {
            message: format!("Missing required field '{}'", field),
            code: ErrorCode::ValMissingField,
            details: HashMap::from([("field".to_string(), field.to_string())]),
            suggestion: Some(format!("Provide a non-empty '{}' value", field)),
        }
    }

    /// Create a store busy error.
    pub fn store_busy(message: impl Into<String>) -> Self {
        Self::StoreBusy {
            message: message.into(),
            code: ErrorCode::StoreBusy,
        }
    }

    /// Create a store timeout error (reported as busy).
    pub fn store_timeout(message: impl Into<String>) -> Self {
        Self::StoreBusy {
            message: message.into(),
            code: ErrorCode::StoreTimeout,
        }
    }

    /// Create a schema mismatch error.
    pub fn schema_mismatch(message: impl Into<String>) -> Self {
        Self::StoreCorrupt {
            message: message.into(),
            code: ErrorCode::StoreSchemaMismatch,
        }
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            code: ErrorCode::DbOperationFailed,
            source: None,
        }
    }

    /// Create an explainer error.
    pub fn explainer(message: impl Into<String>) -> Self {
        Self::Explainer {
            message: message.into(),
            code: ErrorCode::ExpGenerationFailed,
            source: None,
        }
    }

    /// Create an explainer timeout error.
    pub fn explainer_timeout(message: impl Into<String>) -> Self {
        Self::Explainer {
            message: message.into(),
            code: ErrorCode::ExpTimeout,
            source: None,
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            code: ErrorCode::NetConnectionFailed,
            source: None,
        }
    }

    /// Create a no-definition error for a word.
    pub fn no_definition(word: impl Into<String>) -> Self {
        Self::NoDefinitionAvailable {
            word: word.into(),
            code: ErrorCode::DefNotFound,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { code, .. } => *code,
            Self::StoreBusy { code, .. } => *code,
            Self::StoreCorrupt { code, .. } => *code,
            Self::Database { code, .. } => *code,
            Self::Explainer { code, .. } => *code,
            Self::Network { code, .. } => *code,
            Self::NoDefinitionAvailable { code, .. } => *code,
            _ => ErrorCode::Internal,
        }
    }

    /// Whether a read path may swallow this error and fall back.
    ///
    /// Validation failures and missing definitions are terminal.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::StoreBusy { .. }
                | Self::Database { .. }
                | Self::Explainer { .. }
                | Self::Network { .. }
        )
    }

    /// Whether this error signals an incompatible or corrupt store.
    pub fn is_schema_incompatible(&self) -> bool {
        matches!(self, Self::StoreCorrupt { .. })
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Validation { suggestion, .. } => suggestion.as_deref(),
            Self::StoreBusy { .. } => {
                Some("Close other instances using the same database and retry")
            }
            Self::StoreCorrupt { .. } => Some("The store will be recreated on next start"),
            Self::Explainer { .. } => Some("Please check your explainer provider configuration"),
            Self::Network { .. } => Some("Please check your network connection"),
            Self::NoDefinitionAvailable { .. } => {
                Some("Configure an API key to fetch explanations for words outside the word list")
            }
            _ => None,
        }
    }

    /// Convert from an HTTP status code returned by a remote service.
    pub fn from_http_status(status: u16, body: &str) -> Self {
        match status {
            400 | 422 => Self::validation(body),
            401 | 403 => Self::Configuration(format!("Credentials rejected: {}", body)),
            408 | 504 => Self::Network {
                message: body.to_string(),
                code: ErrorCode::NetTimeout,
                source: None,
            },
            _ => Self::network(format!("HTTP {}: {}", status, body)),
        }
    }
}

impl From<rusqlite::Error> for VocabError {
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::ErrorCode as SqliteCode;

        match err.sqlite_error_code() {
            Some(SqliteCode::DatabaseBusy) | Some(SqliteCode::DatabaseLocked) => Self::StoreBusy {
                message: err.to_string(),
                code: ErrorCode::StoreBusy,
            },
            Some(SqliteCode::NotADatabase) | Some(SqliteCode::DatabaseCorrupt) => {
                Self::StoreCorrupt {
                    message: err.to_string(),
                    code: ErrorCode::StoreCorrupted,
                }
            }
            _ => Self::Database {
                message: err.to_string(),
                code: ErrorCode::DbOperationFailed,
                source: Some(Box::new(err)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = VocabError::validation("Invalid input");
        assert_eq!(err.code(), ErrorCode::ValInvalidInput);
        assert!(err.to_string().contains("Invalid input"));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_missing_field_has_suggestion() {
        let err = VocabError::missing_field("verbs");
        assert_eq!(err.code(), ErrorCode::ValMissingField);
        assert!(err.suggestion().unwrap().contains("verbs"));
    }

    #[test]
    fn test_no_definition_is_terminal() {
        let err = VocabError::no_definition("xyz");
        assert_eq!(err.code(), ErrorCode::DefNotFound);
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("xyz"));
    }

    #[test]
    fn test_store_errors() {
        assert!(VocabError::store_busy("locked").is_recoverable());
        assert_eq!(
            VocabError::store_timeout("slow").code(),
            ErrorCode::StoreTimeout
        );
        assert!(VocabError::schema_mismatch("v5").is_schema_incompatible());
    }

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::StoreBusy.as_str(), "STORE_001");
        assert_eq!(ErrorCode::DefNotFound.as_str(), "DEF_001");
    }

    #[test]
    fn test_from_http_status() {
        assert!(matches!(
            VocabError::from_http_status(401, "bad key"),
            VocabError::Configuration(_)
        ));
        assert_eq!(
            VocabError::from_http_status(504, "gateway").code(),
            ErrorCode::NetTimeout
        );
    }
}
