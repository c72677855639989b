//! API error handling.
//!
//! Provides consistent error responses for the API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use media_resolvers::ResolveError;

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Corrective hint for the caller (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// API error type that can be converted to HTTP responses.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub note: Option<String>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            note: None,
        }
    }

    /// Add a corrective hint to the error.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Create a 400 Bad Request error.
    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    /// Create a 500 Internal Server Error.
    pub fn internal(error: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }

    /// Create a 502 Bad Gateway error.
    pub fn bad_gateway(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorResponse {
            error: self.error,
            note: self.note,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::InvalidUrl(msg) => ApiError::bad_request(format!("Invalid URL: {msg}")),
            ResolveError::UnsupportedPlatform => {
                ApiError::bad_request("Unsupported platform")
                    .with_note("Supply a link to a supported social platform post")
            }
            ResolveError::NoMediaFound => ApiError::internal("No media found for this link")
                .with_note("Ensure the post is public and contains media"),
            ResolveError::Timeout => {
                ApiError::new(StatusCode::GATEWAY_TIMEOUT, "Extraction timed out")
                    .with_note("The upstream provider is slow or unreachable; try again")
            }
            ResolveError::Http(e) => {
                tracing::warn!("Upstream HTTP error: {e}");
                ApiError::bad_gateway("Upstream request failed")
            }
            ResolveError::Json(e) => {
                tracing::warn!("Upstream payload error: {e}");
                ApiError::internal("Upstream returned an unreadable payload")
                    .with_note("Ensure the post is public")
            }
            ResolveError::BadPayload(msg) => {
                tracing::warn!("Bad upstream payload: {msg}");
                ApiError::internal("Extraction failed")
                    .with_note("Ensure the post is public and still exists")
            }
            ResolveError::Other(msg) => ApiError::internal(msg),
        }
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
