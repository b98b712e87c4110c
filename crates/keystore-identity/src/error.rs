//! Error types for the identity service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Identity service error types.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Keystore directory '{}' cannot be read: {}", path.display(), source)]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Keystore file '{}': {}", path.display(), source)]
    File {
        path: PathBuf,
        #[source]
        source: FileErrorKind,
    },

    #[error("Address must start with 0x: {0}")]
    MalformedAddress(String),

    #[error("Account not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Why a single keystore file was rejected.
#[derive(Debug, Error)]
pub enum FileErrorKind {
    #[error("read failed: {0}")]
    Read(#[from] std::io::Error),

    #[error("invalid keystore JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

impl IdentityError {
    pub(crate) fn file(path: impl Into<PathBuf>, source: impl Into<FileErrorKind>) -> Self {
        IdentityError::File {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Whether this error can only happen while loading keystores at startup.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            IdentityError::Directory { .. } | IdentityError::File { .. } | IdentityError::Config(_)
        )
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            IdentityError::MalformedAddress(_) => (StatusCode::BAD_REQUEST, "MALFORMED_ADDRESS"),
            IdentityError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            IdentityError::RateLimitExceeded => {
                (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMIT_EXCEEDED")
            }
            IdentityError::Directory { .. } | IdentityError::File { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "KEYSTORE_ERROR")
            }
            IdentityError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
