//! Docsmith Extractor
//!
//! Converts free-form technical documents (API specifications, database
//! schema designs in mixed Markdown/SQL/diagram notation) into structured,
//! typed entities for a downstream catalog/import system.
//!
//! # Architecture
//!
//! ```text
//! Document → Profiler → Chunker → CompletionBackend → Recovery → Aggregator → ParseOutcome
//!                     ↘ RuleBasedExtractor (deterministic, no backend) ↗
//! ```
//!
//! # Key Features
//!
//! - **Document profiling**: token estimation and budget arithmetic decide
//!   whether a document must be chunked
//! - **Budget-aware chunking**: proportional character-offset splitting with
//!   ordinal labels
//! - **Layered response recovery**: fence stripping, direct parse, outer
//!   brace/bracket capture, diagnostic fallback — never throws
//! - **Rule-based fallback**: deterministic scanners for endpoint headings,
//!   Markdown tables, SQL `CREATE TABLE` and Mermaid-style diagrams
//! - **Partial-failure tolerance**: a failed chunk is a diagnostic, never
//!   fatal; the run succeeds if the merged entity list is non-empty
//!
//! # Example Usage
//!
//! ```no_run
//! use docsmith_extractor::{DocumentExtractor, ParserConfig, ParseRequest};
//! use docsmith_domain::TargetKind;
//! use docsmith_llm::{MockBackend, Provider};
//!
//! # async fn example() {
//! let backend = MockBackend::new(r#"{"tables": [], "confidence": 0.9}"#);
//! let extractor = DocumentExtractor::new(
//!     backend,
//!     Provider::Ollama.limits(),
//!     ParserConfig::default(),
//! )
//! .with_progress(|p| eprintln!("chunk {}/{}", p.current + 1, p.total));
//!
//! let outcome = extractor
//!     .parse(ParseRequest::ai("# 用户表 users ...", TargetKind::Schema))
//!     .await;
//!
//! println!("success: {}, entities: {}", outcome.success, outcome.entities.len());
//! # }
//! ```

#![warn(missing_docs)]

mod aggregate;
mod chunking;
mod config;
mod error;
mod extractor;
mod parser;
mod profile;
mod prompt;
mod rules;
mod types;


pub use aggregate::{aggregate, DEFAULT_AI_CONFIDENCE, RULE_BASED_CONFIDENCE};
pub use chunking::{split, DocumentChunk};
pub use config::ParserConfig;
pub use error::ParseError;
pub use extractor::{parse_rule_based, DocumentExtractor, ProgressObserver};
pub use parser::{decode_chunk, recover_payload};
pub use profile::{estimate_tokens, DocumentProfile, DocumentProfiler};
pub use prompt::{chunk_prompt, system_instruction};
pub use rules::extract as extract_rule_based;
pub use types::{ChunkPayload, ParseRequest};
