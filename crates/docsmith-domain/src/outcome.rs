//! Parse outcome: the always-returned result of a pipeline run

use crate::endpoint::ApiEndpoint;
use crate::table::TableSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which kind of entity a document is expected to yield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// API endpoint documentation
    Api,
    /// Database schema documentation
    Schema,
}

impl TargetKind {
    /// Parse a kind token, case-insensitively
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "api" => Some(Self::Api),
            "schema" => Some(Self::Schema),
            _ => None,
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api => f.write_str("api"),
            Self::Schema => f.write_str("schema"),
        }
    }
}

/// Which extraction strategy produced an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStrategy {
    /// Completion-backend assisted extraction
    Ai,
    /// Deterministic rule-based extraction
    RuleBased,
}

/// Entities extracted from one document
///
/// A document is homogeneous: it yields either endpoints or tables, never a
/// mix. Serialized as a plain array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtractedEntities {
    /// API endpoint descriptors
    Endpoints(Vec<ApiEndpoint>),
    /// Table descriptors
    Tables(Vec<TableSchema>),
}

impl ExtractedEntities {
    /// An empty entity list of the given kind
    pub fn empty(kind: TargetKind) -> Self {
        match kind {
            TargetKind::Api => Self::Endpoints(Vec::new()),
            TargetKind::Schema => Self::Tables(Vec::new()),
        }
    }

    /// The kind this list holds
    pub fn kind(&self) -> TargetKind {
        match self {
            Self::Endpoints(_) => TargetKind::Api,
            Self::Tables(_) => TargetKind::Schema,
        }
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        match self {
            Self::Endpoints(v) => v.len(),
            Self::Tables(v) => v.len(),
        }
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Final result of a parse run
///
/// The pipeline always returns an outcome; it never propagates an error to
/// the caller. Partial success is representable: a non-empty `errors` list
/// does not by itself force `success` to false.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseOutcome {
    /// Extracted entities, deduplicated
    pub entities: ExtractedEntities,

    /// True iff at least one entity was extracted and no fatal error occurred
    pub success: bool,

    /// Ordered diagnostics accumulated during the run
    pub errors: Vec<String>,

    /// Extraction reliability estimate in [0, 1]
    pub confidence: f64,

    /// Strategy that produced this outcome
    pub strategy: ParseStrategy,
}

impl ParseOutcome {
    /// A failed outcome with no entities and a single diagnostic
    pub fn failure(
        kind: TargetKind,
        strategy: ParseStrategy,
        message: impl Into<String>,
    ) -> Self {
        Self {
            entities: ExtractedEntities::empty(kind),
            success: false,
            errors: vec![message.into()],
            confidence: 0.0,
            strategy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::HttpMethod;

    #[test]
    fn test_strategy_serialization() {
        assert_eq!(
            serde_json::to_string(&ParseStrategy::RuleBased).unwrap(),
            "\"rule_based\""
        );
        assert_eq!(serde_json::to_string(&ParseStrategy::Ai).unwrap(), "\"ai\"");
    }

    #[test]
    fn test_entities_serialize_as_plain_array() {
        let entities = ExtractedEntities::Endpoints(vec![ApiEndpoint::new(
            "login",
            HttpMethod::Post,
            "/login",
        )]);
        let json = serde_json::to_value(&entities).unwrap();
        assert!(json.is_array());
        assert_eq!(json.as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_untagged_round_trip_distinguishes_kinds() {
        let tables = ExtractedEntities::Tables(vec![crate::table::TableSchema::new("users")]);
        let json = serde_json::to_string(&tables).unwrap();
        let back: ExtractedEntities = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind(), TargetKind::Schema);
    }

    #[test]
    fn test_failure_outcome_shape() {
        let outcome = ParseOutcome::failure(TargetKind::Api, ParseStrategy::Ai, "no entities found");
        assert!(!outcome.success);
        assert!(outcome.entities.is_empty());
        assert_eq!(outcome.errors, vec!["no entities found".to_string()]);
        assert_eq!(outcome.confidence, 0.0);
    }

    #[test]
    fn test_outcome_field_names() {
        let outcome = ParseOutcome::failure(TargetKind::Schema, ParseStrategy::RuleBased, "x");
        let json = serde_json::to_value(&outcome).unwrap();
        for key in ["entities", "success", "errors", "confidence", "strategy"] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
    }
}
