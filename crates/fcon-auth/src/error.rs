//! Auth error types and HTTP error conversions

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors raised while obtaining a token or handling the OAuth flow
#[derive(Debug, Error)]
pub enum AuthError {
    /// No token has been configured or stored yet
    #[error("No access token available")]
    MissingToken,

    /// Stored token is past its expiry and must be refreshed externally
    #[error("Access token expired at {0}")]
    Expired(chrono::DateTime<chrono::Utc>),

    /// Token file could not be read
    #[error("Failed to read token file: {0}")]
    TokenFile(#[from] std::io::Error),

    /// Token file is not valid JSON
    #[error("Invalid token file: {0}")]
    InvalidTokenFile(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Required query parameter absent from an OAuth URL or callback
    #[error("Missing query parameter: {0}")]
    MissingQueryParameter(&'static str),

    /// Callback state does not match any pending authorization
    #[error("Invalid state parameter: {0}")]
    UnknownState(String),
}

/// API error type that converts to HTTP responses
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request
    BadRequest(String),
    /// 404 Not Found
    NotFound(String),
    /// 503 Service Unavailable
    ServiceUnavailable(String),
    /// 500 Internal Server Error
    Internal(String),
}

/// Standard error response format
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg)
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        // Log errors at appropriate levels
        if status.is_server_error() {
            tracing::error!(error = error_type, %message, "API error");
        } else if status.is_client_error() {
            tracing::debug!(error = error_type, %message, "API client error");
        }

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingQueryParameter(_)
            | AuthError::UnknownState(_)
            | AuthError::InvalidUrl(_) => {
                ApiError::BadRequest(err.to_string())
            }
            AuthError::MissingToken | AuthError::Expired(_) => {
                ApiError::ServiceUnavailable(err.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}
