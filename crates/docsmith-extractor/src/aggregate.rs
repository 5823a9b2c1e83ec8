//! Cross-chunk aggregation and deduplication
//!
//! Entities from every chunk are merged by case-insensitive identity key
//! (table name; `(method, path)` for endpoints), preserving first-seen
//! order. On collision the first-seen non-empty value wins per scalar
//! field; list fields are concatenated and deduplicated by their own
//! identity key.

use crate::types::ChunkPayload;
use docsmith_domain::{
    ApiEndpoint, ExtractedEntities, ParseOutcome, ParseStrategy, TableSchema, TargetKind,
};
use std::collections::HashMap;

/// Fixed confidence reported for the rule-based strategy
///
/// Preserved as observed behavior; this is a placeholder, not a calibrated
/// measure.
pub const RULE_BASED_CONFIDENCE: f64 = 0.7;

/// Confidence contributed by an entity-bearing chunk whose payload did not
/// report one
pub const DEFAULT_AI_CONFIDENCE: f64 = 0.8;

/// Merge per-chunk payloads into one document-level outcome
///
/// `success` is true iff the merged entity list is non-empty; emptiness is
/// itself a failure condition, reported as a diagnostic even when no chunk
/// reported a hard error.
pub fn aggregate(
    payloads: Vec<ChunkPayload>,
    strategy: ParseStrategy,
    kind: TargetKind,
) -> ParseOutcome {
    let confidence = match strategy {
        ParseStrategy::RuleBased => RULE_BASED_CONFIDENCE,
        ParseStrategy::Ai => mean_chunk_confidence(&payloads),
    };

    let entities = match kind {
        TargetKind::Api => ExtractedEntities::Endpoints(merge_endpoints(&payloads)),
        TargetKind::Schema => ExtractedEntities::Tables(merge_tables(&payloads)),
    };

    if entities.is_empty() {
        ParseOutcome {
            entities,
            success: false,
            errors: vec!["no entities found".to_string()],
            confidence: 0.0,
            strategy,
        }
    } else {
        ParseOutcome {
            entities,
            success: true,
            errors: Vec::new(),
            confidence: confidence.clamp(0.0, 1.0),
            strategy,
        }
    }
}

/// Arithmetic mean over chunks that produced at least one entity
///
/// Chunks that failed or produced nothing are excluded from the average,
/// not treated as zero.
fn mean_chunk_confidence(payloads: &[ChunkPayload]) -> f64 {
    let contributions: Vec<f64> = payloads
        .iter()
        .filter(|p| !p.entities.is_empty())
        .map(|p| p.confidence.unwrap_or(DEFAULT_AI_CONFIDENCE).clamp(0.0, 1.0))
        .collect();
    if contributions.is_empty() {
        return 0.0;
    }
    contributions.iter().sum::<f64>() / contributions.len() as f64
}

fn merge_endpoints(payloads: &[ChunkPayload]) -> Vec<ApiEndpoint> {
    let mut merged: Vec<ApiEndpoint> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();

    for payload in payloads {
        let ExtractedEntities::Endpoints(endpoints) = &payload.entities else {
            continue;
        };
        for endpoint in endpoints {
            match by_key.get(&endpoint.identity_key()) {
                Some(&i) => merge_endpoint(&mut merged[i], endpoint),
                None => {
                    by_key.insert(endpoint.identity_key(), merged.len());
                    merged.push(endpoint.clone());
                }
            }
        }
    }

    merged
}

fn merge_endpoint(into: &mut ApiEndpoint, from: &ApiEndpoint) {
    if into.name.is_empty() && !from.name.is_empty() {
        into.name = from.name.clone();
    }
    if into.description.is_none() {
        into.description = from.description.clone().filter(|d| !d.is_empty());
    }
    for parameter in &from.parameters {
        let key = parameter.name.to_lowercase();
        if !into.parameters.iter().any(|p| p.name.to_lowercase() == key) {
            into.parameters.push(parameter.clone());
        }
    }
    for response in &from.responses {
        if !into
            .responses
            .iter()
            .any(|r| r.status_code == response.status_code)
        {
            into.responses.push(response.clone());
        }
    }
}

fn merge_tables(payloads: &[ChunkPayload]) -> Vec<TableSchema> {
    let mut merged: Vec<TableSchema> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();

    for payload in payloads {
        let ExtractedEntities::Tables(tables) = &payload.entities else {
            continue;
        };
        for table in tables {
            match by_key.get(&table.identity_key()) {
                Some(&i) => merge_table(&mut merged[i], table),
                None => {
                    by_key.insert(table.identity_key(), merged.len());
                    merged.push(table.clone());
                }
            }
        }
    }

    merged
}

fn merge_table(into: &mut TableSchema, from: &TableSchema) {
    if into.display_name.is_empty() && !from.display_name.is_empty() {
        into.display_name = from.display_name.clone();
    }
    if into.comment.is_empty() && !from.comment.is_empty() {
        into.comment = from.comment.clone();
    }
    if into.engine.is_none() {
        into.engine = from.engine.clone();
    }
    if into.charset.is_none() {
        into.charset = from.charset.clone();
    }
    for field in &from.fields {
        let key = field.name.to_lowercase();
        if !into.fields.iter().any(|f| f.name.to_lowercase() == key) {
            into.fields.push(field.clone());
        }
    }
    for index in &from.indexes {
        let key = index.name.to_lowercase();
        if !into.indexes.iter().any(|i| i.name.to_lowercase() == key) {
            into.indexes.push(index.clone());
        }
    }
    for constraint in &from.constraints {
        let key = constraint.identity_key();
        if !into.constraints.iter().any(|c| c.identity_key() == key) {
            into.constraints.push(constraint.clone());
        }
    }
}
