//! Docsmith Completion Backend Layer
//!
//! Pluggable text-completion backend implementations.
//!
//! # Architecture
//!
//! This crate provides implementations of the `CompletionBackend` trait from
//! `docsmith-domain`. A backend receives a fixed system instruction plus one
//! chunk of document content and returns raw response text; everything else
//! (chunking, recovery, aggregation) happens above this boundary.
//!
//! # Backends
//!
//! - `MockBackend`: deterministic mock for testing
//! - `OllamaBackend`: local Ollama API integration
//! - `OpenAiCompatBackend`: hosted OpenAI-compatible chat APIs
//!
//! No backend retries internally; a failed call surfaces as a single
//! `BackendError` for the caller to record.
//!
//! # Examples
//!
//! ```
//! use docsmith_llm::MockBackend;
//! use docsmith_domain::CompletionBackend;
//!
//! # async fn example() {
//! let backend = MockBackend::new("{\"endpoints\": []}");
//! let result = backend.complete("system", "chunk").await.unwrap();
//! assert_eq!(result, "{\"endpoints\": []}");
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod ollama;
pub mod openai;

use async_trait::async_trait;
use docsmith_domain::CompletionBackend;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use config::{Backend, BackendConfig, Provider, ProviderLimits};
pub use ollama::OllamaBackend;
pub use openai::OpenAiCompatBackend;

/// Errors that can occur during backend operations
#[derive(Error, Debug)]
pub enum BackendError {
    /// Invalid or incomplete backend configuration; raised before any
    /// network call is attempted
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Network or API communication error
    #[error("communication error: {0}")]
    Communication(String),

    /// Non-success HTTP status from the backend
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body or reason text
        message: String,
    },

    /// Response arrived but could not be decoded
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Requested model is not available at the endpoint
    #[error("model not available: {0}")]
    ModelNotAvailable(String),
}

impl BackendError {
    /// Whether this error is a configuration error, which is fatal to a run
    /// (every other variant is recorded per chunk and recovered)
    pub fn is_configuration(&self) -> bool {
        matches!(self, BackendError::Configuration(_))
    }
}

/// Mock completion backend for deterministic testing
///
/// Returns pre-configured responses without any network calls and records
/// every request it receives, so orchestration tests can assert sequential,
/// one-call-per-chunk behavior.
///
/// # Examples
///
/// ```
/// use docsmith_llm::MockBackend;
/// use docsmith_domain::CompletionBackend;
///
/// # async fn example() {
/// let mut backend = MockBackend::new("default");
/// backend.add_response("chunk one", "response one");
///
/// assert_eq!(backend.complete("sys", "chunk one").await.unwrap(), "response one");
/// assert_eq!(backend.complete("sys", "anything else").await.unwrap(), "default");
/// assert_eq!(backend.call_count(), 2);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockBackend {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, String>>>,
    failures: Arc<Mutex<HashSet<String>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockBackend {
    /// Create a mock that returns `response` for every request
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            failures: Arc::new(Mutex::new(HashSet::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a specific response for requests whose content contains `needle`
    pub fn add_response(&mut self, needle: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(needle.into(), response.into());
    }

    /// Fail requests whose content contains `needle` with a communication error
    pub fn add_failure(&mut self, needle: impl Into<String>) {
        self.failures.lock().unwrap().insert(needle.into());
    }

    /// Number of requests received so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Content of every request received so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new("{}")
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    type Error = BackendError;

    async fn complete(
        &self,
        _system_instruction: &str,
        content: &str,
    ) -> Result<String, Self::Error> {
        self.calls.lock().unwrap().push(content.to_string());

        let failures = self.failures.lock().unwrap();
        if failures.iter().any(|needle| content.contains(needle)) {
            return Err(BackendError::Communication("mock failure".to_string()));
        }
        drop(failures);

        let responses = self.responses.lock().unwrap();
        for (needle, response) in responses.iter() {
            if content.contains(needle) {
                return Ok(response.clone());
            }
        }

        Ok(self.default_response.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_default_response() {
        let backend = MockBackend::new("fixed");
        let result = backend.complete("sys", "any").await.unwrap();
        assert_eq!(result, "fixed");
    }

    #[tokio::test]
    async fn test_mock_specific_responses() {
        let mut backend = MockBackend::default();
        backend.add_response("alpha", "one");
        backend.add_response("beta", "two");

        assert_eq!(backend.complete("s", "has alpha inside").await.unwrap(), "one");
        assert_eq!(backend.complete("s", "beta here").await.unwrap(), "two");
        assert_eq!(backend.complete("s", "neither").await.unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_mock_failure_injection() {
        let mut backend = MockBackend::new("ok");
        backend.add_failure("poison");

        let result = backend.complete("s", "contains poison text").await;
        assert!(matches!(result, Err(BackendError::Communication(_))));

        // Failed calls are still recorded
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_records_calls_in_order() {
        let backend = MockBackend::new("ok");
        backend.complete("s", "first").await.unwrap();
        backend.complete("s", "second").await.unwrap();

        assert_eq!(backend.calls(), vec!["first".to_string(), "second".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_clone_shares_state() {
        let backend1 = MockBackend::new("ok");
        let backend2 = backend1.clone();

        backend1.complete("s", "x").await.unwrap();
        assert_eq!(backend2.call_count(), 1);
    }

    #[test]
    fn test_configuration_errors_are_fatal() {
        assert!(BackendError::Configuration("x".into()).is_configuration());
        assert!(!BackendError::Communication("x".into()).is_configuration());
    }
}
