//! Error handling module for the timetable backend.
//!
//! Provides centralized error types with mapping to HTTP status codes and response envelopes.

use std::any::Any;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::models::MalformedDocument;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const MISSING_PAYLOAD: &str = "MISSING_PAYLOAD";
    pub const MISSING_NAME: &str = "MISSING_NAME";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const CONFLICT: &str = "CONFLICT";
    pub const STORAGE_READ_FAILURE: &str = "STORAGE_READ_FAILURE";
    pub const STORAGE_WRITE_FAILURE: &str = "STORAGE_WRITE_FAILURE";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const PAYLOAD_TOO_LARGE: &str = "PAYLOAD_TOO_LARGE";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// `POST /api/data` without a document
    MissingPayload,
    /// Semester creation without a name
    MissingName,
    /// Semester does not exist
    NotFound(String),
    /// Semester name already taken
    Conflict(String),
    /// Document file could not be read or parsed
    StorageRead(String),
    /// Document file could not be serialized or written
    StorageWrite(String),
    /// Malformed request body
    BadRequest(String),
    /// Request body over the configured limit
    PayloadTooLarge,
    /// Anything else, reported without detail
    Internal,
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingPayload => StatusCode::BAD_REQUEST,
            AppError::MissingName => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            // Duplicate names are reported as a plain client error, not 409.
            AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::StorageRead(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::StorageWrite(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::MissingPayload => codes::MISSING_PAYLOAD,
            AppError::MissingName => codes::MISSING_NAME,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Conflict(_) => codes::CONFLICT,
            AppError::StorageRead(_) => codes::STORAGE_READ_FAILURE,
            AppError::StorageWrite(_) => codes::STORAGE_WRITE_FAILURE,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
            AppError::PayloadTooLarge => codes::PAYLOAD_TOO_LARGE,
            AppError::Internal => codes::INTERNAL_ERROR,
        }
    }

    /// Get the message shown to the caller. Storage details stay in the logs.
    pub fn message(&self) -> String {
        match self {
            AppError::MissingPayload => "No data provided".to_string(),
            AppError::MissingName => "Semester name required".to_string(),
            AppError::NotFound(_) => "Semester not found".to_string(),
            AppError::Conflict(_) => "Semester already exists".to_string(),
            AppError::StorageRead(_) => "Failed to read database".to_string(),
            AppError::StorageWrite(_) => "Failed to save database".to_string(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::PayloadTooLarge => "Request body too large".to_string(),
            AppError::Internal => "Internal server error".to_string(),
        }
    }

    pub fn storage_read<E: std::fmt::Display>(err: E) -> Self {
        tracing::error!("Error reading database: {}", err);
        AppError::StorageRead(err.to_string())
    }

    pub fn storage_write<E: std::fmt::Display>(err: E) -> Self {
        tracing::error!("Error writing database: {}", err);
        AppError::StorageWrite(err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::NotFound(name) | AppError::Conflict(name) => {
                write!(f, "{}: {} ({})", self.error_code(), self.message(), name)
            }
            AppError::StorageRead(detail) | AppError::StorageWrite(detail) => {
                write!(f, "{}: {}", self.error_code(), detail)
            }
            _ => write!(f, "{}: {}", self.error_code(), self.message()),
        }
    }
}

impl std::error::Error for AppError {}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge;
        }
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<MalformedDocument> for AppError {
    fn from(err: MalformedDocument) -> Self {
        AppError::storage_read(err)
    }
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        Self {
            success: false,
            error: error.message(),
            code: error.error_code().to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorResponse::new(&self))).into_response()
    }
}

/// Panic handler for `CatchPanicLayer`; never exposes the panic payload.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!("Error: handler panicked: {}", detail);

    AppError::Internal.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::MissingPayload.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::MissingName.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Conflict("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::StorageRead("disk".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_storage_details_not_exposed() {
        let err = AppError::StorageWrite("permission denied (os error 13)".into());
        let body = ErrorResponse::new(&err);

        assert!(!body.success);
        assert_eq!(body.error, "Failed to save database");
        assert_eq!(body.code, codes::STORAGE_WRITE_FAILURE);
        assert!(err.to_string().contains("os error 13"));
    }

    #[test]
    fn test_panic_response_is_generic() {
        let resp = handle_panic(Box::new("secret detail".to_string()));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
