//! Rule-based extraction of table schemas from design documents
//!
//! Recognized sources, each producing `TableSchema` records that aggregation
//! later deduplicates:
//! - fenced SQL blocks containing `CREATE TABLE`
//! - Markdown section headings followed by a field table
//! - Mermaid-style diagram blocks, synthesized into skeleton schemas

use super::{
    detect_table_header, diagram, is_affirmative, is_table_divider, mine_enum_values,
    split_table_row, sql, ColumnMap, ScanState,
};
use docsmith_domain::{FieldSpec, TableSchema};
use once_cell::sync::Lazy;
use regex::Regex;

static HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,6}\s*(.+)$").unwrap());
static ASCII_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").unwrap());
static TYPE_CELL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Za-z]+)(?:\s*\(\s*(\d+)(?:\s*,\s*(\d+))?\s*\))?").unwrap()
});

struct SchemaScanner {
    tables: Vec<TableSchema>,
    state: ScanState,
    fence_tag: String,
    block: Vec<String>,
    heading: Option<String>,
    columns: Option<ColumnMap>,
    current: Option<TableSchema>,
}

/// Extract table schemas from a document, deterministically and in input order
pub fn extract_tables(text: &str) -> Vec<TableSchema> {
    let mut scanner = SchemaScanner {
        tables: Vec::new(),
        state: ScanState::Default,
        fence_tag: String::new(),
        block: Vec::new(),
        heading: None,
        columns: None,
        current: None,
    };

    for line in text.lines() {
        scanner.step(line);
    }
    scanner.finish()
}

impl SchemaScanner {
    fn step(&mut self, line: &str) {
        let trimmed = line.trim();

        if self.state == ScanState::InCodeBlock {
            if trimmed.starts_with("```") {
                self.close_code_block();
            } else {
                self.block.push(line.to_string());
            }
            return;
        }

        if let Some(tag) = trimmed.strip_prefix("```") {
            self.flush_markdown_table();
            self.state = ScanState::InCodeBlock;
            self.fence_tag = tag.trim().to_string();
            self.block.clear();
            return;
        }

        if let Some(cells) = split_table_row(trimmed) {
            self.step_table_row(&cells);
            return;
        }
        if self.state == ScanState::InParameterTable {
            self.flush_markdown_table();
        }

        if let Some(captures) = HEADING_RE.captures(trimmed) {
            self.heading = Some(captures[1].trim().to_string());
        }
    }

    fn step_table_row(&mut self, cells: &[String]) {
        if is_table_divider(cells) {
            return;
        }
        if let Some(map) = detect_table_header(cells) {
            self.flush_markdown_table();
            if let Some(heading) = self.heading.clone() {
                self.columns = Some(map);
                self.state = ScanState::InParameterTable;
                self.current = Some(table_from_heading(&heading));
            }
            return;
        }
        if self.state != ScanState::InParameterTable {
            return;
        }
        let Some(map) = self.columns else { return };
        let Some(current) = self.current.as_mut() else { return };

        let Some(name) = cells.get(map.name).filter(|n| !n.is_empty()) else {
            return;
        };
        current.fields.push(field_from_row(name, cells, map));
    }

    fn close_code_block(&mut self) {
        self.state = ScanState::Default;
        let body = self.block.join("\n");
        self.block.clear();
        let tag = std::mem::take(&mut self.fence_tag);

        if tag.to_lowercase().contains("sql") || body.to_uppercase().contains("CREATE TABLE") {
            self.tables.extend(sql::parse_create_tables(&body));
        } else if diagram::is_diagram(&tag, &body) {
            for entity in diagram::collect_entities(&body) {
                self.tables.push(diagram::skeleton_table(&entity));
            }
        }
    }

    fn flush_markdown_table(&mut self) {
        self.state = ScanState::Default;
        self.columns = None;
        if let Some(table) = self.current.take() {
            if !table.fields.is_empty() {
                self.tables.push(table);
            }
        }
    }

    fn finish(mut self) -> Vec<TableSchema> {
        self.flush_markdown_table();
        self.tables
    }
}

/// Build an empty table from a section heading
///
/// The first ASCII identifier in the heading becomes the table name
/// ("### 用户表 users" → `users`); without one the whole heading text is
/// used. The heading text doubles as the display name.
fn table_from_heading(heading: &str) -> TableSchema {
    let name = ASCII_WORD_RE
        .find(heading)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| heading.to_string());
    let mut table = TableSchema::new(name);
    table.display_name = heading.to_string();
    table
}

/// Map one field-table row to a `FieldSpec`
fn field_from_row(name: &str, cells: &[String], map: ColumnMap) -> FieldSpec {
    let cell = |idx: Option<usize>| idx.and_then(|i| cells.get(i)).cloned().unwrap_or_default();

    let type_cell = cell(map.type_idx);
    let mut field = FieldSpec::new(name, "varchar");
    if let Some(captures) = TYPE_CELL_RE.captures(&type_cell) {
        field.field_type = captures[1].to_lowercase();
        field.length = captures.get(2).and_then(|m| m.as_str().parse().ok());
        field.scale = captures.get(3).and_then(|m| m.as_str().parse().ok());
    }

    field.nullable = if let Some(idx) = map.nullable_idx {
        cells.get(idx).map(|c| is_affirmative(c)).unwrap_or(true)
    } else if let Some(idx) = map.required_idx {
        !cells.get(idx).map(|c| is_affirmative(c)).unwrap_or(false)
    } else {
        true
    };

    let default_cell = cell(map.default_idx);
    let default_cell = default_cell.trim();
    if !default_cell.is_empty() && default_cell != "-" {
        field.default_value = Some(default_cell.to_string());
    }

    field.comment = cell(map.desc_idx);

    let lowered_type = type_cell.to_lowercase();
    field.is_primary_key = name.eq_ignore_ascii_case("id") || lowered_type.contains("primary");

    let row_text = cells.join(" ").to_lowercase();
    if row_text.contains("auto_increment") || row_text.contains("自增") {
        field.is_auto_increment = true;
    }

    if field.field_type == "enum" && !field.comment.is_empty() {
        field.enum_values = mine_enum_values(&field.comment);
    }

    field
}
