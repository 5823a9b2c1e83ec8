//! Trait definitions for external interactions
//!
//! These traits define the boundary between the extraction pipeline and
//! infrastructure. Implementations live in other crates.

use async_trait::async_trait;

/// Trait for text-completion backend operations
///
/// The sole network/I/O boundary of the pipeline. A backend is stateless
/// beyond its configured endpoint, model identifier and credential, all
/// supplied at construction. Implementations must not retry internally;
/// retry policy belongs to the caller.
///
/// Implemented by the infrastructure layer (docsmith-llm).
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Error type for backend operations
    type Error: std::fmt::Display + Send;

    /// Send a fixed system instruction plus one chunk of content and return
    /// the raw response text
    async fn complete(&self, system_instruction: &str, content: &str)
        -> Result<String, Self::Error>;
}
