//! Error types for MindForge.

use thiserror::Error;

/// Result type alias using MindForge's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for MindForge operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource already exists (duplicate email, etc.)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Authentication failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden (authenticated but not allowed)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Remote service (AnythingLLM, Ollama) failed or answered unexpectedly
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Blob storage failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Upstream(e.to_string())
    }
}

impl Error {
    /// True when the error wraps a MySQL duplicate-key violation (ER_DUP_ENTRY).
    pub fn is_duplicate_key(&self) -> bool {
        match self {
            Error::Database(sqlx::Error::Database(db_err)) => {
                db_err.is_unique_violation() || db_err.message().contains("Duplicate entry")
            }
            _ => false,
        }
    }
}
