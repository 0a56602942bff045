//! Error types for eightctl

use thiserror::Error;

/// Core error type for eightctl operations
#[derive(Error, Debug)]
pub enum EightError {
    /// Missing or invalid configuration (e.g. absent credentials)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller input failed a local precondition
    #[error("Validation error: {0}")]
    Validation(String),

    /// The remote service answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure talking to the remote service
    #[error("HTTP error: {0}")]
    Http(String),

    /// Failure while producing output
    #[error("Render error: {0}")]
    Render(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EightError {
    /// Shorthand for a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        EightError::Validation(msg.into())
    }

    /// Shorthand for a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        EightError::Config(msg.into())
    }
}

/// Result type alias for eightctl operations
pub type Result<T> = std::result::Result<T, EightError>;

impl From<serde_json::Error> for EightError {
    fn from(err: serde_json::Error) -> Self {
        EightError::Serialization(err.to_string())
    }
}
