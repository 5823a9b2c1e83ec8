//! Recovery of structured payloads from noisy completion output
//!
//! Completion backends return free-form text: the JSON we asked for may be
//! wrapped in a code fence, prefixed with prose, or emitted as a bare array.
//! Recovery applies a fixed sequence of strategies and never panics; when
//! every layer fails the caller gets a diagnostic carrying a truncated
//! preview of the offending text.

use crate::error::ParseError;
use crate::types::ChunkPayload;
use docsmith_domain::{ApiEndpoint, ExtractedEntities, TableSchema, TargetKind};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// Maximum characters of raw text echoed into a diagnostic
const PREVIEW_CHARS: usize = 200;

/// Recover a JSON payload object from raw completion output
///
/// Layers, applied in order until one succeeds:
/// 1. trim BOM and whitespace, strip a wrapping code fence
/// 2. direct parse of the cleaned string
/// 3. first `{` .. last `}` substring parse
/// 4. first `[` .. last `]` substring parse, wrapped as `{"entities": [...]}`
///
/// A successful parse that yields a bare array is wrapped the same way, so
/// the result is always a JSON object.
pub fn recover_payload(raw: &str) -> Result<Value, ParseError> {
    let cleaned = strip_code_fence(raw.trim_start_matches('\u{feff}').trim());

    // Direct parse
    if let Some(value) = parse_structured(&cleaned) {
        return Ok(wrap_bare_array(value));
    }

    // Greedy outer-brace capture
    if let (Some(start), Some(end)) = (cleaned.find('{'), cleaned.rfind('}')) {
        if start < end {
            if let Some(value) = parse_structured(&cleaned[start..=end]) {
                if value.is_object() {
                    return Ok(value);
                }
            }
        }
    }

    // Greedy outer-bracket capture
    if let (Some(start), Some(end)) = (cleaned.find('['), cleaned.rfind(']')) {
        if start < end {
            if let Some(value) = parse_structured(&cleaned[start..=end]) {
                if value.is_array() {
                    return Ok(wrap_bare_array(value));
                }
            }
        }
    }

    let preview: String = cleaned.chars().take(PREVIEW_CHARS).collect();
    Err(ParseError::MalformedResponse(format!(
        "no recovery strategy succeeded; response begins: {:?}",
        preview
    )))
}

/// Parse a string as JSON, accepting only objects and arrays
fn parse_structured(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(value) if value.is_object() || value.is_array() => Some(value),
        _ => None,
    }
}

/// Wrap a bare array as `{"entities": [...]}`; objects pass through
fn wrap_bare_array(value: Value) -> Value {
    if value.is_array() {
        serde_json::json!({ "entities": value })
    } else {
        value
    }
}

/// Strip a wrapping fenced code block, when the whole payload sits inside one
///
/// Only a fence that wraps the entire text is stripped; fences embedded in
/// the middle of a response are left to the substring-capture layers.
fn strip_code_fence(text: &str) -> String {
    if !text.starts_with("```") {
        return text.to_string();
    }
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() < 2 {
        return text.to_string();
    }
    let last = lines.len() - 1;
    let body_end = if lines[last].trim() == "```" { last } else { lines.len() };
    lines[1..body_end].join("\n")
}

#[derive(Debug, Default, Deserialize)]
struct RecoveredPayload {
    #[serde(default)]
    endpoints: Vec<Value>,
    #[serde(default)]
    tables: Vec<Value>,
    #[serde(default)]
    entities: Vec<Value>,
    #[serde(default)]
    confidence: Option<f64>,
}

/// Decode one chunk's raw response into typed entities for the target kind
///
/// Individual elements that fail to decode are skipped with a warning;
/// partial recovery of a chunk is better than discarding it.
pub fn decode_chunk(raw: &str, kind: TargetKind) -> Result<ChunkPayload, ParseError> {
    let value = recover_payload(raw)?;
    let payload: RecoveredPayload = serde_json::from_value(value)
        .map_err(|e| ParseError::MalformedResponse(format!("unexpected payload shape: {}", e)))?;

    let entities = match kind {
        TargetKind::Api => {
            let bucket = if payload.endpoints.is_empty() {
                payload.entities
            } else {
                payload.endpoints
            };
            ExtractedEntities::Endpoints(decode_elements::<ApiEndpoint>(bucket))
        }
        TargetKind::Schema => {
            let bucket = if payload.tables.is_empty() {
                payload.entities
            } else {
                payload.tables
            };
            ExtractedEntities::Tables(decode_elements::<TableSchema>(bucket))
        }
    };

    Ok(ChunkPayload {
        entities,
        confidence: payload.confidence,
    })
}

fn decode_elements<T: serde::de::DeserializeOwned>(elements: Vec<Value>) -> Vec<T> {
    let mut decoded = Vec::new();
    for (idx, element) in elements.into_iter().enumerate() {
        match serde_json::from_value::<T>(element) {
            Ok(entity) => decoded.push(entity),
            Err(e) => warn!("skipping element {}: {}", idx, e),
        }
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsmith_domain::HttpMethod;

    const ENDPOINT_JSON: &str = r#"{"endpoints": [{"name": "login", "method": "POST", "path": "/api/v1/auth/login"}], "confidence": 0.9}"#;

    #[test]
    fn test_direct_parse() {
        let value = recover_payload(ENDPOINT_JSON).unwrap();
        assert!(value.get("endpoints").is_some());
    }

    #[test]
    fn test_fenced_payload() {
        let raw = format!("```json\n{}\n```", ENDPOINT_JSON);
        let value = recover_payload(&raw).unwrap();
        assert!(value.get("endpoints").is_some());
    }

    #[test]
    fn test_fence_without_language_tag() {
        let raw = format!("```\n{}\n```", ENDPOINT_JSON);
        assert!(recover_payload(&raw).is_ok());
    }

    #[test]
    fn test_prose_wrapped_payload() {
        let raw = format!(
            "Here is the structured result you asked for:\n{}\nLet me know if you need more.",
            ENDPOINT_JSON
        );
        let value = recover_payload(&raw).unwrap();
        assert!(value.get("endpoints").is_some());
    }

    #[test]
    fn test_bare_array_is_wrapped() {
        let raw = r#"[{"name": "users"}]"#;
        let value = recover_payload(raw).unwrap();
        assert!(value.get("entities").is_some());
        assert_eq!(value["entities"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_prose_wrapped_array_falls_back_to_bracket_capture() {
        // Two elements: the brace span "{...}, {...}" is not valid JSON, so
        // recovery falls through to the bracket layer and wraps the array.
        let raw = "The tables are:\n[{\"name\": \"users\"}, {\"name\": \"orders\"}]\nDone.";
        let value = recover_payload(raw).unwrap();
        assert_eq!(value["entities"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_bom_and_whitespace_trimmed() {
        let raw = format!("\u{feff}  \n{}", ENDPOINT_JSON);
        assert!(recover_payload(&raw).is_ok());
    }

    #[test]
    fn test_unrecoverable_text_yields_preview_diagnostic() {
        let err = recover_payload("I could not find any structured data, sorry.").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("no recovery strategy succeeded"));
        assert!(message.contains("could not find"));
    }

    #[test]
    fn test_preview_is_truncated() {
        let long = "x".repeat(10_000);
        let err = recover_payload(&long).unwrap_err();
        assert!(err.to_string().len() < 1_000);
    }

    #[test]
    fn test_decode_chunk_api() {
        let payload = decode_chunk(ENDPOINT_JSON, TargetKind::Api).unwrap();
        assert_eq!(payload.confidence, Some(0.9));
        match payload.entities {
            ExtractedEntities::Endpoints(endpoints) => {
                assert_eq!(endpoints.len(), 1);
                assert_eq!(endpoints[0].method, HttpMethod::Post);
                assert_eq!(endpoints[0].path, "/api/v1/auth/login");
            }
            _ => panic!("expected endpoints"),
        }
    }

    #[test]
    fn test_decode_chunk_schema_from_entities_bucket() {
        let raw = r#"[{"name": "users", "fields": [{"name": "id", "type": "bigint"}]}]"#;
        let payload = decode_chunk(raw, TargetKind::Schema).unwrap();
        match payload.entities {
            ExtractedEntities::Tables(tables) => {
                assert_eq!(tables.len(), 1);
                assert_eq!(tables[0].fields.len(), 1);
            }
            _ => panic!("expected tables"),
        }
    }

    #[test]
    fn test_decode_chunk_skips_invalid_elements() {
        let raw = r#"{"endpoints": [
            {"name": "ok", "method": "GET", "path": "/a"},
            {"name": "missing method and path"},
            {"name": "ok2", "method": "DELETE", "path": "/b"}
        ]}"#;
        let payload = decode_chunk(raw, TargetKind::Api).unwrap();
        assert_eq!(payload.entities.len(), 2);
    }

    #[test]
    fn test_decode_chunk_malformed() {
        let result = decode_chunk("not json at all", TargetKind::Api);
        assert!(matches!(result, Err(ParseError::MalformedResponse(_))));
    }
}
