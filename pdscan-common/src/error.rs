//! Common error types for pdscan

use thiserror::Error;

/// Common result type for pdscan operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the library and the web service
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Classifier loading or inference failure
    #[error("Model error: {0}")]
    Model(String),

    /// Report rendering failure
    #[error("Report error: {0}")]
    Report(String),

    /// Email delivery failure
    #[error("Notification error: {0}")]
    Notify(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
