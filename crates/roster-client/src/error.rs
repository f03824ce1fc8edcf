//! Error types for the platform client

use thiserror::Error;

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors raised while talking to the platform
#[derive(Error, Debug)]
pub enum ClientError {
    /// Missing credentials or malformed endpoint templates
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The authentication endpoint rejected the request
    #[error("Authentication failed with HTTP {status}: {body}")]
    Authentication { status: u16, body: String },

    /// Authentication succeeded but no token was found in the response
    #[error("Authentication response carried no session token")]
    MissingToken,

    /// A resource request returned a non-success status
    #[error("Resource request failed with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Transport-level failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
