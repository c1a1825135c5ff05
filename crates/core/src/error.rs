// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing prerequisite (blocking prompt, no state change)
    #[error("{0}")]
    Validation(#[from] crate::domain::DomainError),

    #[error("Remote call failed: {0}")]
    Remote(#[from] crate::port::RemoteCallError),

    #[error("Not authenticated: please log in first")]
    Unauthenticated,

    #[error("{0}")]
    Auth(String),

    /// Response arrived after the workflow moved on (reset or reselect)
    #[error("Discarded stale {0} response")]
    Superseded(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True for errors the operator is expected to fix locally
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// lopdf errors only surface while encoding exports
impl From<lopdf::Error> for AppError {
    fn from(err: lopdf::Error) -> Self {
        AppError::Export(err.to_string())
    }
}
