//! HTTP client error types.

use thiserror::Error;

/// Errors that can occur when querying the catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Failed to send the request.
    #[error("Request failed: {0}")]
    RequestError(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP error response.
    #[error("HTTP {status}: {message}")]
    HttpError { status: u16, message: String },

    /// The backend answered but flagged the call as unsuccessful.
    #[error("Backend rejected request: {0}")]
    Rejected(String),

    /// Failed to parse response body.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Request timeout.
    #[error("Request timed out")]
    Timeout,
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::ParseError(e.to_string())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_decode() {
            FetchError::ParseError(e.to_string())
        } else if let Some(status) = e.status() {
            FetchError::HttpError {
                status: status.as_u16(),
                message: e.to_string(),
            }
        } else {
            FetchError::RequestError(e.to_string())
        }
    }
}
