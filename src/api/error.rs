// src/api/error.rs
// Centralized error handling for HTTP API responses

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use tracing::{error, warn};

use crate::inventory::repository::StoreError;
use crate::inventory::validation::{InputError, ValidationErrors};
use crate::upstream::UpstreamError;

/// Standard API error response format
#[derive(Debug)]
pub struct ApiError {
    pub message: String,
    pub status_code: StatusCode,
    pub error_code: Option<String>,
    pub errors: Option<ValidationErrors>,
}

impl ApiError {
    fn with_code(status_code: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code,
            error_code: Some(code.to_string()),
            errors: None,
        }
    }

    /// Create a new internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }

    /// Create a new bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    /// Create a new not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    /// Create a new conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::CONFLICT, "CONFLICT", message)
    }

    /// 422 carrying per-field messages
    pub fn validation(errors: ValidationErrors) -> Self {
        Self {
            message: errors.summary(),
            status_code: StatusCode::UNPROCESSABLE_ENTITY,
            error_code: Some("VALIDATION_FAILED".to_string()),
            errors: Some(errors),
        }
    }

    /// Upstream API could not be reached or answered with garbage
    pub fn bad_gateway(code: &str, message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::BAD_GATEWAY, code, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response_json = json!({
            "error": true,
            "message": self.message,
            "status": self.status_code.as_u16()
        });

        if let Some(error_code) = self.error_code {
            response_json["error_code"] = json!(error_code);
        }
        if let Some(errors) = self.errors {
            response_json["errors"] = json!(errors);
        }

        (self.status_code, Json(response_json)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::validation(errors)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Integrity(reason) => {
                warn!("Integrity violation: {}", reason);
                ApiError::conflict("The request conflicts with existing records")
            }
            StoreError::Database(e) => db_error("inventory query", e),
        }
    }
}

impl From<InputError> for ApiError {
    fn from(err: InputError) -> Self {
        match err {
            InputError::Invalid(errors) => ApiError::validation(errors),
            InputError::Store(e) => e.into(),
        }
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        warn!("Upstream failure: {}", err);
        match err {
            UpstreamError::InvalidResponse { .. } => ApiError::bad_gateway(
                "UPSTREAM_INVALID_RESPONSE",
                "Upstream service returned an invalid response",
            ),
            UpstreamError::Unavailable { .. } | UpstreamError::Status { .. } => {
                ApiError::bad_gateway("UPSTREAM_UNAVAILABLE", "Upstream service is unavailable")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::with_code(rejection.status(), "INVALID_BODY", rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

/// Extension trait for Option<T> to create ApiError for None cases
pub trait IntoApiErrorOption<T> {
    fn ok_or_not_found(self, message: &str) -> Result<T, ApiError>;
}

impl<T> IntoApiErrorOption<T> for Option<T> {
    fn ok_or_not_found(self, message: &str) -> Result<T, ApiError> {
        self.ok_or_else(|| ApiError::not_found(message))
    }
}

/// Helper function for database operation errors
pub fn db_error(operation: &str, error: impl std::fmt::Debug) -> ApiError {
    let message = format!("Database error during {operation}");
    error!("{}: {:?}", message, error);
    ApiError::internal(message)
}
