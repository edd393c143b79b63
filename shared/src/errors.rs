//! Error types for the Form Coach domain

use thiserror::Error;

/// Errors raised by the pure domain rules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unsupported processing mode: {0}")]
    InvalidMode(String),

    #[error("Unknown activity: {0}")]
    UnknownActivity(String),

    #[error("Unknown posture: {0}")]
    InvalidPosture(String),
}
