//! HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use studia_core::Error;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Error returned by handlers and extractors, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    BadRequest(String),
    NotFound(String),
    PayloadTooLarge(String),
    Unprocessable(String),
    TooManyRequests(String),
    /// Anything unexpected. The cause is logged, never returned.
    Internal(Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Unauthorized(msg) => ApiError::Unauthorized(msg),
            Error::NotFound(_) => ApiError::NotFound("Material not found".to_string()),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            err @ (Error::FileTooLarge { .. }
            | Error::LegacyDocFormat
            | Error::UnsupportedFormat(_)
            | Error::Parse(_)) => ApiError::BadRequest(err.to_string()),
            Error::EmptyResult { .. } => ApiError::Unprocessable(
                "Could not extract meaningful text from this document".to_string(),
            ),
            err if err.is_transient() => {
                tracing::warn!(subsystem = "api", error = %err, "LLM gateway asked to back off");
                ApiError::TooManyRequests(
                    "The AI service is busy. Please try again in a moment".to_string(),
                )
            }
            Error::GatewayPayloadTooLarge(body) => {
                tracing::warn!(subsystem = "api", gateway_body = %body, "LLM gateway refused payload");
                ApiError::PayloadTooLarge(
                    "File is too large for AI extraction. Try a smaller file".to_string(),
                )
            }
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Internal(err) => {
                tracing::error!(subsystem = "api", error = %err, "Request failed");
                INTERNAL_MESSAGE.to_string()
            }
            ApiError::Unauthorized(msg)
            | ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::Unprocessable(msg)
            | ApiError::TooManyRequests(msg) => msg,
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
