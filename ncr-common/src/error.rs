//! Common error types for the NCR services

use thiserror::Error;

/// Common result type for NCR operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across NCR crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed NCR record or field
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
