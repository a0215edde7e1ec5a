//! Error handling for templeton.
//! Defines the error type and result alias used throughout the application.

use std::io;
use thiserror::Error;

/// Custom error types for templeton operations.
///
/// Every variant except [`Error::ValidationError`] aborts the run. Validation
/// failures are handled by the variable collector, which asks again.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    /// Directory traversal failure while replicating assets
    #[error("IO error: {0}")]
    WalkDirError(#[from] walkdir::Error),

    /// Configuration document missing, unreadable or malformed
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Template text that does not parse under its delimiters
    #[error("template: {template}:{line}: {message}")]
    ParseError { template: String, line: usize, message: String },

    /// Failures while executing a parsed template
    #[error("template: {template}: {message}")]
    RenderError { template: String, message: String },

    /// Represents validation failures in user input
    #[error("{0}")]
    ValidationError(String),

    /// Terminal interaction failures while collecting values
    #[error("Prompt error: {0}")]
    PromptError(#[from] dialoguer::Error),

    /// Malformed answers supplied on stdin
    #[error("Invalid answers: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(1);
}
