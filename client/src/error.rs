//! Client error handling
//!
//! Every fallible operation in this crate returns [`ClientError`]. The
//! display string of a backend failure is exactly what the user is shown.

use form_coach_shared::{DomainError, ProcessingMode};
use thiserror::Error;

/// Shown when a processing failure carries no usable message
pub const FALLBACK_FAILURE_MESSAGE: &str = "Video could not be processed. Please try again.";

/// Client error type
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Processing mode '{0}' is not supported by this client")]
    UnsupportedMode(ProcessingMode),

    /// Non-success response from the backend; displays the backend's own detail
    #[error("{message}")]
    Backend { status: u16, message: String },

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid backend response: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("History storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] validator::ValidationErrors),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("{0}")]
    InvalidState(String),
}

impl ClientError {
    /// Message suitable for a toast notification
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            FALLBACK_FAILURE_MESSAGE.to_string()
        } else {
            message
        }
    }

    /// HTTP status of a backend rejection, if that is what this is
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Backend { status, .. } => Some(*status),
            ClientError::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;
