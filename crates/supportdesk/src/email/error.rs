//! Email input error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading mailbox input.
#[derive(Error, Debug)]
pub enum EmailError {
    /// Failed to parse email message.
    #[error("Failed to parse email: {0}")]
    ParseError(String),

    /// IO error when reading exported messages.
    #[error("IO error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for email operations.
pub type Result<T> = std::result::Result<T, EmailError>;
