//! Ollama Backend Implementation
//!
//! Integration with Ollama's local generate API. Runs models locally, so no
//! credential is involved.
//!
//! # Examples
//!
//! ```no_run
//! use docsmith_llm::OllamaBackend;
//!
//! let backend = OllamaBackend::new("http://localhost:11434", "qwen2.5");
//! ```

use crate::BackendError;
use async_trait::async_trait;
use docsmith_domain::CompletionBackend;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for completion requests (120 seconds; local models are slow)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Ollama backend for local completion
///
/// One request per `complete` call; no internal retries. Retry policy, if
/// any, belongs to the caller.
pub struct OllamaBackend {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

/// Request body for the Ollama generate API
#[derive(Serialize)]
struct OllamaGenerateRequest {
    model: String,
    system: String,
    prompt: String,
    stream: bool,
}

/// Response from the Ollama generate API
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
    #[allow(dead_code)]
    done: bool,
}

impl OllamaBackend {
    /// Create a new Ollama backend
    ///
    /// # Parameters
    ///
    /// - `base_url`: Ollama API endpoint (e.g. "http://localhost:11434")
    /// - `model`: model to use (e.g. "qwen2.5", "mistral")
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("reqwest client construction cannot fail with static config");

        Self {
            base_url: base_url.into(),
            model: model.into(),
            client,
        }
    }

    /// Create a backend against the default local endpoint
    pub fn default_endpoint(model: impl Into<String>) -> Self {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    async fn generate(&self, system: &str, prompt: &str) -> Result<String, BackendError> {
        let url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));

        let request_body = OllamaGenerateRequest {
            model: self.model.clone(),
            system: system.to_string(),
            prompt: prompt.to_string(),
            stream: false,
        };

        debug!("Ollama request to {} with model {}", url, self.model);

        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| BackendError::Communication(format!("request failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(BackendError::ModelNotAvailable(self.model.clone()));
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(BackendError::Status { status, message });
        }

        let body: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("failed to parse response: {}", e)))?;

        Ok(body.response)
    }
}

#[async_trait]
impl CompletionBackend for OllamaBackend {
    type Error = BackendError;

    async fn complete(
        &self,
        system_instruction: &str,
        content: &str,
    ) -> Result<String, Self::Error> {
        self.generate(system_instruction, content).await
    }
}
