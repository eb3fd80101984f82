/// Unified error types for guest credential resolution
use thiserror::Error;

/// Main error type for storage backends, the federation client and configuration
#[derive(Error, Debug)]
pub enum CredsError {
    /// Key-value storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite backend errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis backend errors
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding/decoding errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport-level HTTP errors talking to the federation service
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error returned by the federation service itself
    #[error("Federation service error ({code}): {message}")]
    Federation { code: String, message: String },

    /// Configuration errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CredsError {
    pub fn federation(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Federation {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for credential operations
pub type CredsResult<T> = Result<T, CredsError>;
