//! Command-line argument definitions

use clap::Parser;
use std::path::PathBuf;

/// Turn loosely-structured API and database design documents into typed
/// endpoint/table descriptors
#[derive(Parser, Debug)]
#[command(name = "docsmith", version, about)]
pub struct Cli {
    /// Document to parse; reads stdin when omitted
    pub input: Option<PathBuf>,

    /// What the document describes: "api" or "schema"
    #[arg(short, long)]
    pub kind: String,

    /// Use the deterministic rule-based extractor instead of a completion
    /// backend
    #[arg(long)]
    pub rule_based: bool,

    /// Completion provider: "ollama", "openai" or "deepseek"
    #[arg(long, default_value = "ollama")]
    pub provider: String,

    /// Model identifier
    #[arg(long, default_value = "qwen2.5")]
    pub model: String,

    /// API base URL; defaults to the provider's canonical endpoint
    #[arg(long)]
    pub base_url: Option<String>,

    /// API key for hosted providers
    #[arg(long, env = "DOCSMITH_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Parser configuration file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
}
