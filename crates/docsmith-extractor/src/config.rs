//! Configuration for the extraction pipeline

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the document parser
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Tokens reserved per call for the system instruction and prompt
    /// scaffolding; subtracted from the provider's input budget
    pub prompt_overhead_tokens: u64,

    /// Hard cap on accepted document length (characters)
    pub max_document_chars: usize,

    /// Maximum time for a single completion call (seconds)
    pub completion_timeout_secs: u64,
}

impl ParserConfig {
    /// Get the completion timeout as a Duration
    pub fn completion_timeout(&self) -> Duration {
        Duration::from_secs(self.completion_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.prompt_overhead_tokens == 0 {
            return Err("prompt_overhead_tokens must be greater than 0".to_string());
        }
        if self.max_document_chars == 0 {
            return Err("max_document_chars must be greater than 0".to_string());
        }
        if self.completion_timeout_secs == 0 {
            return Err("completion_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ParserConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            prompt_overhead_tokens: 1_500,
            max_document_chars: 500_000,
            completion_timeout_secs: 120,
        }
    }
}
