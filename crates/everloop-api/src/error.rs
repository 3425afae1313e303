//! Everloop — API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use everloop_core::error::ProgressionError;
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database connection or pool error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `ProgressionError` that implements
/// `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub ProgressionError);

impl From<ProgressionError> for ApiError {
    fn from(err: ProgressionError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            ProgressionError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            ProgressionError::Duplicate { .. } => (StatusCode::CONFLICT, "already_discovered"),
            ProgressionError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            ProgressionError::ExternalService(_) => (StatusCode::BAD_GATEWAY, "narrative_error"),
            ProgressionError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
        };

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
