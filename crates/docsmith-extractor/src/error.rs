//! Error types for the extraction pipeline

use thiserror::Error;

/// Errors that can occur during a parse run
///
/// Only `Configuration` is fatal to a whole run; every other variant is
/// recovered per chunk and recorded as a diagnostic on the outcome.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Invalid pipeline or backend configuration; short-circuits before any
    /// chunking or network activity
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Completion backend failure (network, timeout, non-success status)
    #[error("backend error: {0}")]
    Backend(String),

    /// No recovery strategy could extract a structured payload from the
    /// response text
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Document exceeds the accepted length
    #[error("document too long: {0} chars (max: {1})")]
    DocumentTooLong(usize, usize),
}

impl From<serde_json::Error> for ParseError {
    fn from(e: serde_json::Error) -> Self {
        ParseError::MalformedResponse(e.to_string())
    }
}
