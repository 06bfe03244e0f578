//! Error types shared across the Surgilog crates

use thiserror::Error;

/// Result alias used throughout Surgilog
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the library and database layers
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Filesystem operation failed (root folder, database file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON column (surgery steps, step evaluations) could not be read
    /// or written
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested entity does not exist or is soft-deleted
    #[error("Not found: {0}")]
    NotFound(String),

    /// A uniqueness rule was violated, such as a duplicate username
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Invalid value, such as an unknown role or record status
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invariant violation inside the service
    #[error("Internal error: {0}")]
    Internal(String),
}
