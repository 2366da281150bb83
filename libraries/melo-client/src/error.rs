//! Error types for the Melo client.

use thiserror::Error;

/// Errors that can occur when talking to the Melo backend.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// No usable id token and no way to obtain one
    #[error("Authentication required")]
    AuthRequired,

    /// Token refresh failed
    #[error("Token refresh failed: {0}")]
    TokenRefreshFailed(String),

    /// Invalid server or resource URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Server is offline or unreachable
    #[error("Server unreachable: {0}")]
    ServerUnreachable(String),

    /// Token is not a decodable JWT
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
