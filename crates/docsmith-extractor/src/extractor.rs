//! Core document extraction orchestration

use crate::aggregate::aggregate;
use crate::chunking;
use crate::config::ParserConfig;
use crate::error::ParseError;
use crate::parser::decode_chunk;
use crate::profile::{DocumentProfile, DocumentProfiler};
use crate::prompt;
use crate::rules;
use crate::types::{ChunkPayload, ParseRequest};
use docsmith_domain::{CompletionBackend, ParseOutcome, ParseProgress, ParseStrategy, TargetKind};
use docsmith_llm::ProviderLimits;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Progress observer invoked once per chunk, before processing begins
pub type ProgressObserver = Box<dyn Fn(ParseProgress) + Send + Sync>;

/// The document extractor drives the whole pipeline: profile, chunk,
/// complete, recover, aggregate
///
/// One instance can serve many runs; each `parse` call owns its own chunk
/// list and accumulator, and snapshots the configuration when it begins
/// (copy-on-start). Chunks are processed strictly sequentially, one
/// completion response in flight at a time. The public contract is
/// "always returns an outcome, never throws": every failure short of an
/// invalid configuration is recovered per chunk and recorded as a
/// diagnostic.
pub struct DocumentExtractor<B: CompletionBackend> {
    backend: Arc<B>,
    limits: ProviderLimits,
    config: ParserConfig,
    progress: Option<ProgressObserver>,
    cancel: Option<Arc<AtomicBool>>,
}

impl<B> DocumentExtractor<B>
where
    B: CompletionBackend,
    B::Error: std::fmt::Display,
{
    /// Create a new extractor over a completion backend
    pub fn new(backend: B, limits: ProviderLimits, config: ParserConfig) -> Self {
        Self {
            backend: Arc::new(backend),
            limits,
            config,
            progress: None,
            cancel: None,
        }
    }

    /// Install a progress observer
    ///
    /// Invoked exactly once per chunk per run, before that chunk's
    /// processing begins, with `current` strictly increasing from 0.
    pub fn with_progress(mut self, observer: impl Fn(ParseProgress) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(observer));
        self
    }

    /// Install a cooperative cancellation flag
    ///
    /// Checked only between chunks: a chunk in flight always runs to
    /// completion or failure before cancellation takes effect.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Profile a document against this extractor's provider budget
    pub fn profile(&self, text: &str) -> DocumentProfile {
        DocumentProfiler::new(self.limits, self.config.prompt_overhead_tokens).profile(text)
    }

    /// Parse one document into structured entities
    pub async fn parse(&self, request: ParseRequest) -> ParseOutcome {
        // Copy-on-start: a configuration change made mid-run affects only
        // subsequent runs
        let config = self.config.clone();

        if let Err(message) = config.validate() {
            let error = ParseError::Configuration(message);
            return ParseOutcome::failure(request.kind, request.strategy, error.to_string());
        }
        if config.prompt_overhead_tokens >= self.limits.max_input_tokens {
            let error = ParseError::Configuration(format!(
                "prompt overhead {} exceeds provider input limit {}",
                config.prompt_overhead_tokens, self.limits.max_input_tokens
            ));
            return ParseOutcome::failure(request.kind, request.strategy, error.to_string());
        }
        if request.text.len() > config.max_document_chars {
            let error =
                ParseError::DocumentTooLong(request.text.len(), config.max_document_chars);
            return ParseOutcome::failure(request.kind, request.strategy, error.to_string());
        }

        match request.strategy {
            ParseStrategy::RuleBased => self.parse_rule_based(&request),
            ParseStrategy::Ai => self.parse_with_backend(&request, &config).await,
        }
    }

    /// Deterministic path: no chunking, no progress events, no backend
    fn parse_rule_based(&self, request: &ParseRequest) -> ParseOutcome {
        info!(
            "rule-based parse: kind {}, {} chars",
            request.kind,
            request.text.len()
        );
        let entities = rules::extract(&request.text, request.kind);
        let payload = ChunkPayload {
            entities,
            confidence: None,
        };
        let outcome = aggregate(vec![payload], ParseStrategy::RuleBased, request.kind);
        info!(
            "rule-based parse complete: {} entities, success {}",
            outcome.entities.len(),
            outcome.success
        );
        outcome
    }

    /// Backend-assisted path: profile, chunk, one sequential completion call
    /// per chunk, best-effort recovery
    async fn parse_with_backend(
        &self,
        request: &ParseRequest,
        config: &ParserConfig,
    ) -> ParseOutcome {
        let profiler = DocumentProfiler::new(self.limits, config.prompt_overhead_tokens);
        let profile = profiler.profile(&request.text);
        let chunks = chunking::split(&request.text, profile.chunk_count);
        let total = chunks.len();

        info!(
            "parse start: kind {}, {} estimated tokens, {} chunk(s)",
            request.kind, profile.estimated_tokens, total
        );

        let system = prompt::system_instruction(request.kind);
        let mut payloads: Vec<ChunkPayload> = Vec::with_capacity(total);
        let mut diagnostics: Vec<String> = Vec::new();

        for chunk in &chunks {
            if self.is_cancelled() {
                warn!("parse cancelled before chunk {}", chunk.index);
                diagnostics.push(format!("cancelled before chunk {}", chunk.index));
                break;
            }

            self.emit_progress(ParseProgress {
                current: chunk.index,
                total,
                chunk_label: chunk.label.clone(),
            });

            debug!(
                "processing chunk {}/{} (~{} tokens)",
                chunk.index + 1,
                total,
                chunk.estimated_tokens
            );

            let content = prompt::chunk_prompt(&chunk.text);
            let payload = match timeout(
                config.completion_timeout(),
                self.backend.complete(system, &content),
            )
            .await
            {
                Err(_) => {
                    let error = ParseError::Backend("completion call timed out".to_string());
                    warn!("chunk {}: {}", chunk.index, error);
                    diagnostics.push(format!("chunk {}: {}", chunk.index, error));
                    ChunkPayload::empty(request.kind)
                }
                Ok(Err(e)) => {
                    let error = ParseError::Backend(e.to_string());
                    warn!("chunk {}: {}", chunk.index, error);
                    diagnostics.push(format!("chunk {}: {}", chunk.index, error));
                    ChunkPayload::empty(request.kind)
                }
                Ok(Ok(raw)) => match decode_chunk(&raw, request.kind) {
                    Ok(payload) => {
                        debug!(
                            "chunk {}: recovered {} entities",
                            chunk.index,
                            payload.entities.len()
                        );
                        payload
                    }
                    Err(e) => {
                        warn!("chunk {}: {}", chunk.index, e);
                        diagnostics.push(format!("chunk {}: {}", chunk.index, e));
                        ChunkPayload::empty(request.kind)
                    }
                },
            };
            payloads.push(payload);
        }

        let mut outcome = aggregate(payloads, ParseStrategy::Ai, request.kind);
        if !diagnostics.is_empty() {
            diagnostics.extend(std::mem::take(&mut outcome.errors));
            outcome.errors = diagnostics;
        }

        info!(
            "parse complete: {} entities, success {}, {} diagnostic(s)",
            outcome.entities.len(),
            outcome.success,
            outcome.errors.len()
        );
        outcome
    }

    fn emit_progress(&self, progress: ParseProgress) {
        if let Some(observer) = &self.progress {
            observer(progress);
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|flag| flag.load(Ordering::Relaxed))
            .unwrap_or(false)
    }
}

/// Convenience entry point for the rule-based path without a backend
///
/// Equivalent to running the orchestrator with the rule-based strategy; the
/// deterministic extractors involve no I/O, so no backend or async context
/// is needed.
pub fn parse_rule_based(text: &str, kind: TargetKind) -> ParseOutcome {
    let entities = rules::extract(text, kind);
    aggregate(
        vec![ChunkPayload {
            entities,
            confidence: None,
        }],
        ParseStrategy::RuleBased,
        kind,
    )
}
