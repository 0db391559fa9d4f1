//! Common error types for the text-to-image gallery

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Settings(#[from] config::ConfigError),

    /// Bad or missing input from the caller
    #[error("{0}")]
    Validation(String),

    /// A credential or endpoint the request needs is not configured
    #[error("{0}")]
    Configuration(String),

    /// The image provider failed or produced nothing usable
    #[error("{0}")]
    Provider(String),

    /// Raw failure reported by the record store
    #[error("{0}")]
    Store(String),

    /// A store failure surfaced at an endpoint, with the endpoint's context
    #[error("{context}: {reason}")]
    Persistence {
        context: &'static str,
        reason: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Wrap a store failure with the context of the operation that hit it.
    ///
    /// Only the store's own message is kept, so a `Store("duplicate key")`
    /// under `"Failed to save image"` renders as
    /// `Failed to save image: duplicate key`.
    pub fn persistence(context: &'static str, source: AppError) -> Self {
        let reason = match source {
            AppError::Store(reason) => reason,
            other => other.to_string(),
        };
        AppError::Persistence { context, reason }
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Settings(_)
            | AppError::Configuration(_)
            | AppError::Provider(_)
            | AppError::Store(_)
            | AppError::Persistence { .. }
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error body returned by every endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
