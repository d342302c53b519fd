//! Client error types

use reqwest::StatusCode;
use thiserror::Error;

/// Generic notification text when the server gave no message
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong!";

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request did not complete (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server rejected the request with a `{ "message": ... }` body
    #[error("API error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Server refused the payload without a message body
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Local precondition violated; nothing was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Coarse error taxonomy used to decide how failures are surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Remote call did not complete
    NetworkFailure,
    /// Remote call completed with an error status or body
    ServerRejection,
    /// Local precondition violated before any call was made
    ValidationFailure,
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(e) if e.status().is_none() => ErrorKind::NetworkFailure,
            Self::Http(_)
            | Self::Api { .. }
            | Self::Unauthorized
            | Self::Forbidden(_)
            | Self::NotFound(_)
            | Self::BadRequest(_)
            | Self::Serialization(_)
            | Self::Internal(_) => ErrorKind::ServerRejection,
            Self::Validation(_) => ErrorKind::ValidationFailure,
        }
    }

    /// Server-provided message, if the server sent one
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }

    /// Text for a transient notification
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            _ => self
                .server_message()
                .unwrap_or(GENERIC_FAILURE_MESSAGE)
                .to_string(),
        }
    }
}
