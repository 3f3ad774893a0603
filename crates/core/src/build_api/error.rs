//! Error types for the build API client.

use thiserror::Error;

/// Errors that can occur while querying build metadata.
#[derive(Debug, Error)]
pub enum BuildApiError {
    /// The HTTP client could not be constructed.
    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    /// Request timed out.
    #[error("Build API request timed out")]
    Timeout,

    /// Could not reach the build API.
    #[error("Connection to build API failed: {0}")]
    ConnectionFailed(String),

    /// The API answered with a non-success status.
    #[error("Build API returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The response did not match the expected shape.
    #[error("Failed to decode build list: {0}")]
    Decode(String),
}

impl BuildApiError {
    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::ConnectionFailed(e.to_string())
        } else {
            Self::ConnectionFailed(format!("request failed: {}", e))
        }
    }

    /// Whether the API rejected the credential.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::HttpStatus { status: 401 | 403, .. })
    }
}
