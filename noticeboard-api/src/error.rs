//! API error handling.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use noticeboard_core::error::BoardError;

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    code: String,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(status: StatusCode, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: code.into(),
        }
    }

    /// Bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, "BAD_REQUEST")
    }

    /// Unauthorized error.
    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", "UNAUTHORIZED")
    }

    /// Not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message, "NOT_FOUND")
    }

    /// Internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message, "INTERNAL_ERROR")
    }

    /// Validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message, "VALIDATION_ERROR")
    }

    /// HTTP status of this error.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &str {
        &self.code
    }
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
            },
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<BoardError> for ApiError {
    fn from(err: BoardError) -> Self {
        match err {
            BoardError::ValidationError(message) => ApiError::validation(message),
            BoardError::Unauthorized => ApiError::unauthorized(),
            BoardError::NotFound(_) => ApiError::not_found("Not found"),
            BoardError::ServerMisconfigured(_) => {
                tracing::error!(error = %err, "Admin gate is not configured");
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    err.to_string(),
                    "SERVER_MISCONFIGURED",
                )
            }
            BoardError::ReadError { .. } => {
                tracing::error!(error = %err, "Store read failed");
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to read announcements",
                    "STORAGE_ERROR",
                )
            }
            BoardError::WriteError { .. } => {
                tracing::error!(error = %err, "Store write failed");
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to write announcements",
                    "STORAGE_ERROR",
                )
            }
            _ => {
                tracing::error!(error = %err, "Internal error");
                ApiError::internal("An internal error occurred")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonSyntaxError(_) => ApiError::bad_request("Invalid JSON payload"),
            JsonRejection::JsonDataError(err) => ApiError::validation(err.body_text()),
            JsonRejection::MissingJsonContentType(err) => {
                ApiError::new(err.status(), err.body_text(), "UNSUPPORTED_MEDIA_TYPE")
            }
            other => ApiError::new(other.status(), other.body_text(), "BAD_REQUEST"),
        }
    }
}
