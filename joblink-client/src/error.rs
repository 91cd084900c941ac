//! Error types for the Rundeck client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to the remote Rundeck server
///
/// Transport and protocol failures are kept distinct so a caller can tell
/// "could not reach the remote system" from "the remote API answered with a
/// shape this client does not understand". Neither is retried internally.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection failure, timeout, or TLS failure
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-2xx status
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error body from the API
        message: String,
    },

    /// The response body was not parseable or missed an expected field
    #[error("unexpected response from remote API: {0}")]
    Protocol(String),

    /// The client configuration was rejected before any request was made
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status >= 500)
    }
}
