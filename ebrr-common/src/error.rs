//! Common error types for the records review tools

use thiserror::Error;

/// Common result type for records review operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the records review crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Checkpoint file could not be read, parsed or written
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
