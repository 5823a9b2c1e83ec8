//! Request and intermediate types for the extraction pipeline

use docsmith_domain::{ExtractedEntities, ParseStrategy, TargetKind};

/// Request to parse one document
#[derive(Debug, Clone)]
pub struct ParseRequest {
    /// Raw document text; never mutated by the pipeline
    pub text: String,

    /// Which kind of entity the document is expected to yield
    pub kind: TargetKind,

    /// Which extraction strategy to use
    pub strategy: ParseStrategy,
}

impl ParseRequest {
    /// Create an AI-strategy request
    pub fn ai(text: impl Into<String>, kind: TargetKind) -> Self {
        Self {
            text: text.into(),
            kind,
            strategy: ParseStrategy::Ai,
        }
    }

    /// Create a rule-based request
    pub fn rule_based(text: impl Into<String>, kind: TargetKind) -> Self {
        Self {
            text: text.into(),
            kind,
            strategy: ParseStrategy::RuleBased,
        }
    }
}

/// Entities recovered from one chunk, plus the chunk's reported confidence
///
/// A failed chunk contributes an empty payload; aggregation treats those as
/// non-contributing rather than zero-confidence.
#[derive(Debug, Clone)]
pub struct ChunkPayload {
    /// Entities recovered from this chunk
    pub entities: ExtractedEntities,

    /// Backend-reported confidence, when the payload carried one
    pub confidence: Option<f64>,
}

impl ChunkPayload {
    /// An empty payload of the given kind (used for failed chunks)
    pub fn empty(kind: TargetKind) -> Self {
        Self {
            entities: ExtractedEntities::empty(kind),
            confidence: None,
        }
    }
}
