//! Error types for FordConnect client operations

use fcon_core::MappingError;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while talking to the vendor API
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Vendor API returned a non-success status
    #[error("Server error {status}: {message}")]
    Status { status: u16, message: String },

    /// Failed to parse response body
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Telemetry body could not be normalized
    #[error("Telemetry mapping failed: {0}")]
    Mapping(#[from] MappingError),

    /// Access token cannot be used as a header value
    #[error("Invalid access token: {0}")]
    InvalidToken(String),

    /// Timeout
    #[error("Request timed out")]
    Timeout,
}

impl ClientError {
    /// Create a status error from status code and message
    pub fn status_error(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True for HTTP 429 Too Many Requests
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }

    /// True when the payload arrived but could not be mapped
    pub fn is_mapping(&self) -> bool {
        matches!(self, Self::Mapping(_))
    }
}
