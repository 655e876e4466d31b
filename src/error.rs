//! Domain error types for the e2e tooling.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.

use std::path::PathBuf;

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Authentication against the API failed
    #[error(transparent)]
    Auth(#[from] crate::services::auth::AuthError),

    /// A result or spec file could not be parsed
    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File system operation failed
    #[error("File system error: {0}")]
    FileSystem(String),

    /// External process could not be started or crashed
    #[error("Process error: {0}")]
    Process(String),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(String),

    /// Local language model failed to produce output
    #[error("Model error: {0}")]
    Model(String),
}

impl AppError {
    /// Build a parse error for a specific file.
    pub fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        AppError::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

// Conversion implementations for common error types

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::FileSystem(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<quick_xml::Error> for AppError {
    fn from(err: quick_xml::Error) -> Self {
        AppError::InvalidInput(format!("XML parsing error: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Http(err.to_string())
    }
}
