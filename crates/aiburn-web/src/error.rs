//! JSON error responses

use aiburn_core::{CoreError, UsageError};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// An error rendered as `{"error": message}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn too_many_requests() -> Self {
        Self::new(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many requests. Please try again later.",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let status = match err {
            CoreError::ModelNotFound { .. } => StatusCode::NOT_FOUND,
            CoreError::InvalidTokenRange { .. } | CoreError::InvalidTokenShare { .. } => {
                StatusCode::BAD_REQUEST
            }
        };
        Self::new(status, err.to_string())
    }
}

impl From<UsageError> for ApiError {
    fn from(err: UsageError) -> Self {
        let status = match err {
            UsageError::InvalidProvider(_) | UsageError::InvalidApiKey => StatusCode::BAD_REQUEST,
            UsageError::Unauthorized => StatusCode::UNAUTHORIZED,
            UsageError::NotFound => StatusCode::NOT_FOUND,
            UsageError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            UsageError::Network => StatusCode::SERVICE_UNAVAILABLE,
            UsageError::Upstream(_) | UsageError::InvalidResponse => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = rejection.status();
        let message = if status == StatusCode::PAYLOAD_TOO_LARGE {
            "Payload too large".to_string()
        } else {
            rejection.body_text()
        };
        Self::new(status, message)
    }
}
