//! Common error types for the VoxIQ client

use thiserror::Error;

/// Common result type for VoxIQ operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the VoxIQ client
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure (wraps reqwest::Error)
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend rejected the request; `detail` is the structured message
    /// from the error envelope, or the HTTP status text when absent
    #[error("{detail}")]
    Api { status: u16, detail: String },

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Realtime channel failure
    #[error("Realtime channel error: {0}")]
    Channel(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Batch close refused while uploads are still processing
    #[error("{0} file(s) still processing")]
    UploadsInProgress(usize),
}

impl Error {
    /// HTTP status for API errors, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
