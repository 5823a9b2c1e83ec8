//! Deterministic rule-based extraction
//!
//! The non-AI fallback path: line-scanning state machines that recognize
//! endpoint headings, Markdown parameter tables, SQL `CREATE TABLE`
//! statements and Mermaid-style diagrams, producing the same entity shapes
//! as the backend-assisted path. Identical input text always yields an
//! identical entity list, in input order.

pub mod api;
pub mod schema;

mod diagram;
mod sql;

use docsmith_domain::{ExtractedEntities, TargetKind};
use once_cell::sync::Lazy;
use regex::Regex;

/// Extract entities from a document without any backend call
pub fn extract(text: &str, kind: TargetKind) -> ExtractedEntities {
    match kind {
        TargetKind::Api => ExtractedEntities::Endpoints(api::extract_endpoints(text)),
        TargetKind::Schema => ExtractedEntities::Tables(schema::extract_tables(text)),
    }
}

/// States of the shared line scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScanState {
    /// Scanning prose, headings and structure markers
    Default,
    /// Inside a fenced code block
    InCodeBlock,
    /// Inside a recognized Markdown parameter/field table
    InParameterTable,
}

/// Column-index mapping of a recognized Markdown table header
#[derive(Debug, Clone, Copy)]
pub(crate) struct ColumnMap {
    pub name: usize,
    pub type_idx: Option<usize>,
    pub required_idx: Option<usize>,
    pub nullable_idx: Option<usize>,
    pub default_idx: Option<usize>,
    pub desc_idx: Option<usize>,
}

const NAME_LABELS: &[&str] = &[
    "参数名", "参数", "名称", "字段名", "字段", "列名", "name", "parameter", "field", "column",
];
const TYPE_LABELS: &[&str] = &["类型", "type"];
const REQUIRED_LABELS: &[&str] = &["必填", "必需", "required"];
const NULLABLE_LABELS: &[&str] = &["可空", "允许空", "允许null", "nullable"];
const DEFAULT_LABELS: &[&str] = &["默认", "default"];
const DESC_LABELS: &[&str] = &["说明", "描述", "备注", "注释", "description", "comment", "remark"];

/// Recognize a parameter/field table header row
///
/// A header qualifies when it carries both a name-like and a type-like
/// column label, in Chinese or English.
pub(crate) fn detect_table_header(cells: &[String]) -> Option<ColumnMap> {
    let find = |labels: &[&str]| {
        cells.iter().position(|cell| {
            let lowered = cell.trim().to_lowercase();
            !lowered.is_empty() && labels.iter().any(|label| lowered.contains(label))
        })
    };

    let name = find(NAME_LABELS)?;
    let type_idx = find(TYPE_LABELS)?;
    Some(ColumnMap {
        name,
        type_idx: Some(type_idx),
        required_idx: find(REQUIRED_LABELS),
        nullable_idx: find(NULLABLE_LABELS),
        default_idx: find(DEFAULT_LABELS),
        desc_idx: find(DESC_LABELS),
    })
}

/// Split a Markdown table row into trimmed cells
///
/// Returns `None` for lines that are not table rows.
pub(crate) fn split_table_row(line: &str) -> Option<Vec<String>> {
    let trimmed = line.trim();
    if !trimmed.starts_with('|') && !trimmed.contains(" | ") {
        return None;
    }
    let cells: Vec<String> = trimmed
        .trim_matches('|')
        .split('|')
        .map(|cell| cell.trim().to_string())
        .collect();
    if cells.len() < 2 {
        return None;
    }
    Some(cells)
}

static DIVIDER_CELL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^:?-{2,}:?$").unwrap());

/// Whether a row is the `|---|---|` divider under a table header
pub(crate) fn is_table_divider(cells: &[String]) -> bool {
    cells
        .iter()
        .filter(|c| !c.is_empty())
        .all(|c| DIVIDER_CELL_RE.is_match(c))
        && cells.iter().any(|c| !c.is_empty())
}

/// Whether a table cell affirms a yes/no column ("是"/"Y"/"true", ...)
pub(crate) fn is_affirmative(cell: &str) -> bool {
    let lowered = cell.trim().to_lowercase();
    lowered.contains('是')
        || lowered.contains('✓')
        || matches!(lowered.as_str(), "y" | "yes" | "true" | "required" | "必填")
}

static ENUM_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:可选值|枚举值|枚举|取值|optional values|allowed values|values)\s*[:：]?\s*(.+)$")
        .unwrap()
});
static QUOTED_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"['"‘“']([^'"’”]+)['"’”]"#).unwrap());
static PAREN_CONTENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[(（]([^)）]+)[)）]").unwrap());

/// Mine candidate enumeration values from a column comment
///
/// Ordered patterns; the first one yielding at least one non-empty token
/// wins:
/// 1. quoted, comma-separated list after an optional-values marker
/// 2. content inside parentheses (ASCII or full-width), split on list
///    separators
pub(crate) fn mine_enum_values(comment: &str) -> Option<Vec<String>> {
    if comment.trim().is_empty() {
        return None;
    }

    if let Some(captures) = ENUM_MARKER_RE.captures(comment) {
        let tail = captures.get(1).map_or("", |m| m.as_str());
        let values: Vec<String> = QUOTED_TOKEN_RE
            .captures_iter(tail)
            .map(|c| c[1].trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        if !values.is_empty() {
            return Some(values);
        }
    }

    if let Some(captures) = PAREN_CONTENT_RE.captures(comment) {
        let values: Vec<String> = captures[1]
            .split([',', '，', '、', '/', '|'])
            .map(|v| v.trim().trim_matches(['\'', '"', '‘', '’', '“', '”']).to_string())
            .filter(|v| !v.is_empty())
            .collect();
        if !values.is_empty() {
            return Some(values);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(row: &str) -> Vec<String> {
        split_table_row(row).unwrap()
    }

    #[test]
    fn test_split_table_row() {
        assert_eq!(
            cells("| username | string | 是 | 用户名 |"),
            vec!["username", "string", "是", "用户名"]
        );
        assert!(split_table_row("plain prose line").is_none());
    }

    #[test]
    fn test_divider_detection() {
        assert!(is_table_divider(&cells("|---|-----|:--:|")));
        assert!(!is_table_divider(&cells("| a | b |")));
    }

    #[test]
    fn test_header_detection_chinese() {
        let map = detect_table_header(&cells("| 参数名 | 类型 | 必填 | 说明 |")).unwrap();
        assert_eq!(map.name, 0);
        assert_eq!(map.type_idx, Some(1));
        assert_eq!(map.required_idx, Some(2));
        assert_eq!(map.desc_idx, Some(3));
    }

    #[test]
    fn test_header_detection_english() {
        let map = detect_table_header(&cells("| Field | Type | Nullable | Default | Comment |"))
            .unwrap();
        assert_eq!(map.name, 0);
        assert_eq!(map.nullable_idx, Some(2));
        assert_eq!(map.default_idx, Some(3));
        assert_eq!(map.desc_idx, Some(4));
    }

    #[test]
    fn test_header_requires_name_and_type() {
        assert!(detect_table_header(&cells("| one | two | three |")).is_none());
    }

    #[test]
    fn test_affirmative_markers() {
        for marker in ["是", "Y", "y", "true", "YES", "✓", "是（必填）"] {
            assert!(is_affirmative(marker), "{marker} should affirm");
        }
        for marker in ["否", "N", "no", "false", ""] {
            assert!(!is_affirmative(marker), "{marker} should not affirm");
        }
    }

    #[test]
    fn test_enum_mining_marker_pattern() {
        let values = mine_enum_values("状态，可选值：'active', 'disabled', 'deleted'").unwrap();
        assert_eq!(values, vec!["active", "disabled", "deleted"]);
    }

    #[test]
    fn test_enum_mining_paren_pattern() {
        let values = mine_enum_values("订单状态（pending、paid、shipped）").unwrap();
        assert_eq!(values, vec!["pending", "paid", "shipped"]);
    }

    #[test]
    fn test_enum_mining_marker_wins_over_parens() {
        let values = mine_enum_values("类型（见文档），取值: 'a','b'").unwrap();
        assert_eq!(values, vec!["a", "b"]);
    }

    #[test]
    fn test_enum_mining_none() {
        assert!(mine_enum_values("just a plain comment").is_none());
        assert!(mine_enum_values("").is_none());
    }
}
