//! Backend configuration: provider selection, limits and validation
//!
//! Configuration is an explicit value handed to the pipeline at call time.
//! Nothing here reads global state; the orchestrator snapshots the value when
//! a run begins, so a change made mid-run affects only subsequent runs.

use crate::ollama::OllamaBackend;
use crate::openai::OpenAiCompatBackend;
use crate::BackendError;
use async_trait::async_trait;
use docsmith_domain::CompletionBackend;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported completion providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Local Ollama instance; no credential required
    Ollama,
    /// Hosted OpenAI API
    OpenAi,
    /// Hosted DeepSeek API (OpenAI-compatible)
    DeepSeek,
}

impl Provider {
    /// Parse a provider token, case-insensitively
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "ollama" => Some(Self::Ollama),
            "openai" => Some(Self::OpenAi),
            "deepseek" => Some(Self::DeepSeek),
            _ => None,
        }
    }

    /// Whether this provider requires an API key
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Self::Ollama)
    }

    /// Default API base URL
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Ollama => "http://localhost:11434",
            Self::OpenAi => "https://api.openai.com/v1",
            Self::DeepSeek => "https://api.deepseek.com/v1",
        }
    }

    /// Input-token budget and pacing constants for this provider
    pub fn limits(&self) -> ProviderLimits {
        match self {
            Self::Ollama => ProviderLimits {
                max_input_tokens: 8_192,
                seconds_per_chunk: 30,
            },
            Self::OpenAi => ProviderLimits {
                max_input_tokens: 128_000,
                seconds_per_chunk: 15,
            },
            Self::DeepSeek => ProviderLimits {
                max_input_tokens: 64_000,
                seconds_per_chunk: 15,
            },
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ollama => f.write_str("ollama"),
            Self::OpenAi => f.write_str("openai"),
            Self::DeepSeek => f.write_str("deepseek"),
        }
    }
}

/// Per-provider constants the profiler needs for budget arithmetic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderLimits {
    /// Maximum input tokens a single call may carry
    pub max_input_tokens: u64,
    /// Linear per-chunk processing-time estimate, for progress UI only
    pub seconds_per_chunk: u64,
}

/// Configuration of one completion backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Which provider to talk to
    pub provider: Provider,

    /// Model identifier (e.g. "qwen2.5", "gpt-4o-mini", "deepseek-chat")
    pub model: String,

    /// API base URL; defaults to the provider's canonical endpoint
    #[serde(default)]
    pub base_url: Option<String>,

    /// Credential for hosted providers
    #[serde(default)]
    pub api_key: Option<String>,
}

impl BackendConfig {
    /// Create a configuration with the provider's default base URL
    pub fn new(provider: Provider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            base_url: None,
            api_key: None,
        }
    }

    /// Set the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Effective base URL
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }

    /// Validate the configuration
    ///
    /// A hosted provider without an API key is a configuration error, raised
    /// here — before any network call is attempted.
    pub fn validate(&self) -> Result<(), BackendError> {
        if self.model.trim().is_empty() {
            return Err(BackendError::Configuration(
                "model must not be empty".to_string(),
            ));
        }
        if self.provider.requires_api_key()
            && self.api_key.as_deref().map_or(true, |k| k.trim().is_empty())
        {
            return Err(BackendError::Configuration(format!(
                "provider '{}' requires an API key",
                self.provider
            )));
        }
        Ok(())
    }

    /// Validate and construct the backend this configuration describes
    pub fn build(&self) -> Result<Backend, BackendError> {
        self.validate()?;
        let backend = match self.provider {
            Provider::Ollama => Backend::Ollama(OllamaBackend::new(self.base_url(), &self.model)),
            Provider::OpenAi | Provider::DeepSeek => {
                Backend::OpenAiCompat(OpenAiCompatBackend::new(
                    self.base_url(),
                    &self.model,
                    self.api_key.as_deref().unwrap_or_default(),
                ))
            }
        };
        Ok(backend)
    }
}

/// A constructed backend, dispatching to the concrete client
pub enum Backend {
    /// Local Ollama client
    Ollama(OllamaBackend),
    /// Hosted OpenAI-compatible client
    OpenAiCompat(OpenAiCompatBackend),
}

#[async_trait]
impl CompletionBackend for Backend {
    type Error = BackendError;

    async fn complete(
        &self,
        system_instruction: &str,
        content: &str,
    ) -> Result<String, Self::Error> {
        match self {
            Backend::Ollama(b) => b.complete(system_instruction, content).await,
            Backend::OpenAiCompat(b) => b.complete(system_instruction, content).await,
        }
    }
}
