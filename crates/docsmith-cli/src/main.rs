//! Docsmith CLI - parse a design document and print the structured outcome.

mod cli;

use anyhow::{bail, Context};
use clap::Parser;
use cli::Cli;
use docsmith_domain::TargetKind;
use docsmith_extractor::{parse_rule_based, DocumentExtractor, ParseRequest, ParserConfig};
use docsmith_llm::{BackendConfig, Provider};
use std::io::Read;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let kind = TargetKind::parse(&cli.kind)
        .with_context(|| format!("unknown kind '{}' (expected: api, schema)", cli.kind))?;

    let text = match &cli.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            buffer
        }
    };

    let outcome = if cli.rule_based {
        parse_rule_based(&text, kind)
    } else {
        let Some(provider) = Provider::parse(&cli.provider) else {
            bail!(
                "unknown provider '{}' (expected: ollama, openai, deepseek)",
                cli.provider
            );
        };

        let mut backend_config = BackendConfig::new(provider, &cli.model);
        if let Some(base_url) = &cli.base_url {
            backend_config = backend_config.with_base_url(base_url);
        }
        if let Some(api_key) = &cli.api_key {
            backend_config = backend_config.with_api_key(api_key);
        }
        let backend = backend_config.build()?;

        let parser_config = match &cli.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                ParserConfig::from_toml(&raw).map_err(anyhow::Error::msg)?
            }
            None => ParserConfig::default(),
        };

        let extractor = DocumentExtractor::new(backend, provider.limits(), parser_config)
            .with_progress(|p| match &p.chunk_label {
                Some(label) => eprintln!("processing chunk {}/{} ({})", p.current + 1, p.total, label),
                None => eprintln!("processing chunk {}/{}", p.current + 1, p.total),
            });

        extractor.parse(ParseRequest::ai(text, kind)).await
    };

    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if !outcome.success {
        std::process::exit(1);
    }
    Ok(())
}
