//! API error types with IntoResponse
//!
//! Errors are converted to `{"error", "message"}` JSON bodies. Store and
//! song-info failures are logged here with their full cause chain; the
//! client only sees the service message.

use std::error::Error as _;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::models::ValidationError;
use crate::service::{ErrorKind, SongError};

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Request input failed validation (400)
    Validation(ValidationError),

    /// Request body could not be read as JSON (400)
    InvalidBody { message: String },

    /// Song service failure, status by kind
    Song(SongError),
}

/// Render an error and all of its sources as one line.
fn cause_chain(err: &SongError) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::Validation(e) => (StatusCode::BAD_REQUEST, "validation_error", e.to_string()),
            Self::InvalidBody { message } => {
                (StatusCode::BAD_REQUEST, "invalid_body", message.clone())
            }
            Self::Song(e) => {
                let (status, code) = match e.kind() {
                    ErrorKind::NotFound => (StatusCode::NOT_FOUND, "not_found"),
                    ErrorKind::AlreadyExists => (StatusCode::CONFLICT, "already_exists"),
                    ErrorKind::Validation => (StatusCode::BAD_REQUEST, "validation_error"),
                    ErrorKind::ExternalSource => {
                        tracing::error!(error = %cause_chain(e), "song-info lookup failed");
                        (StatusCode::BAD_GATEWAY, "bad_gateway")
                    }
                    ErrorKind::Persistence => {
                        tracing::error!(error = %cause_chain(e), "database error");
                        (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
                    }
                };
                (status, code, e.to_string())
            }
        };

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<SongError> for ApiError {
    fn from(e: SongError) -> Self {
        Self::Song(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody {
            message: rejection.body_text(),
        }
    }
}
