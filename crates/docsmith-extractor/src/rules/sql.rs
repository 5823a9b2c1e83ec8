//! Parsing of SQL `CREATE TABLE` statements found in fenced code blocks

use super::mine_enum_values;
use docsmith_domain::{
    ConstraintKind, ConstraintSpec, FieldSpec, IndexKind, IndexSpec, TableSchema,
};
use once_cell::sync::Lazy;
use regex::Regex;

static CREATE_TABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)create\s+table\s+(?:if\s+not\s+exists\s+)?[`"]?(\w+)[`"]?\s*\("#).unwrap()
});

static COLUMN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^[`"]?(\w+)[`"]?\s+([a-z]+)(?:\s*\(\s*(\d+)(?:\s*,\s*(\d+))?\s*\))?(.*)$"#)
        .unwrap()
});

static ENUM_COLUMN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^[`"]?(\w+)[`"]?\s+(enum|set)\s*\(([^)]*)\)(.*)$"#).unwrap()
});

static DEFAULT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)default\s+(?:'([^']*)'|([^\s,]+))"#).unwrap());

static COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?i)comment\s+'([^']*)'"#).unwrap());

static KEY_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^(unique|fulltext)?\s*(?:key|index)\s+[`"]?(\w+)[`"]?\s*\(([^)]*)\)"#)
        .unwrap()
});

static UNIQUE_BARE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^unique(?:\s+(?:key|index))?\s*\(").unwrap());

static FOREIGN_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)foreign\s+key\s*\(\s*[`"]?(\w+)[`"]?\s*\)\s*references\s+[`"]?(\w+)[`"]?\s*\(\s*[`"]?(\w+)[`"]?\s*\)"#,
    )
    .unwrap()
});

static ENGINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)engine\s*=\s*(\w+)").unwrap());
static CHARSET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:default\s+)?charset\s*=\s*(\w+)").unwrap());
static TABLE_COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)comment\s*=\s*'([^']*)'").unwrap());

/// Parse every `CREATE TABLE` statement in a block of SQL
pub(crate) fn parse_create_tables(sql: &str) -> Vec<TableSchema> {
    let mut tables = Vec::new();

    for captures in CREATE_TABLE_RE.captures_iter(sql) {
        let whole = captures.get(0).unwrap();
        let name = captures[1].to_string();

        // The regex ends at the opening paren; balance from there
        let body_start = whole.end();
        let Some(body_end) = matching_paren(sql, body_start) else {
            continue;
        };
        let body = &sql[body_start..body_end];
        let tail_end = sql[body_end..].find(';').map_or(sql.len(), |i| body_end + i);
        let tail = &sql[body_end..tail_end];

        tables.push(parse_table(name, body, tail));
    }

    tables
}

fn parse_table(name: String, body: &str, tail: &str) -> TableSchema {
    let mut table = TableSchema::new(name);

    for segment in split_top_level(body) {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        parse_segment(&mut table, segment);
    }

    table.engine = ENGINE_RE.captures(tail).map(|c| c[1].to_string());
    table.charset = CHARSET_RE.captures(tail).map(|c| c[1].to_string());
    if let Some(captures) = TABLE_COMMENT_RE.captures(tail) {
        table.comment = captures[1].to_string();
    }
    if !table.comment.is_empty() {
        table.display_name = table.comment.clone();
    }

    table
}

/// Dispatch one comma-separated definition segment
fn parse_segment(table: &mut TableSchema, segment: &str) {
    let upper = segment.to_uppercase();

    if upper.starts_with("PRIMARY KEY") {
        let fields = paren_list(segment);
        for field in &fields {
            if let Some(spec) = find_field_mut(table, field) {
                spec.is_primary_key = true;
            }
        }
        if !fields.is_empty() {
            table.indexes.push(IndexSpec {
                name: "PRIMARY".to_string(),
                kind: IndexKind::Primary,
                fields,
                is_unique: true,
            });
        }
        return;
    }

    let after_constraint = if upper.starts_with("CONSTRAINT") {
        // CONSTRAINT <name> FOREIGN KEY ... / CONSTRAINT <name> UNIQUE ...
        segment
            .splitn(3, char::is_whitespace)
            .nth(2)
            .unwrap_or(segment)
    } else {
        segment
    };
    let after_upper = after_constraint.to_uppercase();

    if after_upper.starts_with("FOREIGN KEY") {
        if let Some(captures) = FOREIGN_KEY_RE.captures(after_constraint) {
            table.constraints.push(ConstraintSpec {
                kind: ConstraintKind::ForeignKey,
                column: captures[1].to_string(),
                referenced_table: Some(captures[2].to_string()),
                referenced_column: Some(captures[3].to_string()),
            });
        }
        return;
    }

    if let Some(captures) = KEY_LINE_RE.captures(after_constraint) {
        let kind = match captures.get(1).map(|m| m.as_str().to_uppercase()) {
            Some(ref k) if k == "UNIQUE" => IndexKind::Unique,
            Some(ref k) if k == "FULLTEXT" => IndexKind::Fulltext,
            _ => IndexKind::Index,
        };
        table.indexes.push(IndexSpec {
            name: captures[2].to_string(),
            kind,
            fields: captures[3]
                .split(',')
                .map(|f| f.trim().trim_matches(['`', '"']).to_string())
                .filter(|f| !f.is_empty())
                .collect(),
            is_unique: kind == IndexKind::Unique,
        });
        return;
    }

    if UNIQUE_BARE_RE.is_match(after_constraint) {
        // UNIQUE (col) without an index name
        for column in paren_list(after_constraint) {
            table.constraints.push(ConstraintSpec {
                kind: ConstraintKind::Unique,
                column,
                referenced_table: None,
                referenced_column: None,
            });
        }
        return;
    }

    if let Some(field) = parse_column(segment) {
        table.fields.push(field);
    }
}

/// Parse one column definition segment
fn parse_column(segment: &str) -> Option<FieldSpec> {
    let (mut field, rest) = if let Some(captures) = ENUM_COLUMN_RE.captures(segment) {
        let mut field = FieldSpec::new(&captures[1], captures[2].to_lowercase());
        let values: Vec<String> = captures[3]
            .split(',')
            .map(|v| v.trim().trim_matches(['\'', '"']).to_string())
            .filter(|v| !v.is_empty())
            .collect();
        if !values.is_empty() {
            field.enum_values = Some(values);
        }
        (field, captures.get(4).map_or("", |m| m.as_str()).to_string())
    } else if let Some(captures) = COLUMN_RE.captures(segment) {
        let mut field = FieldSpec::new(&captures[1], captures[2].to_lowercase());
        field.length = captures.get(3).and_then(|m| m.as_str().parse().ok());
        field.scale = captures.get(4).and_then(|m| m.as_str().parse().ok());
        (field, captures.get(5).map_or("", |m| m.as_str()).to_string())
    } else {
        return None;
    };

    let upper = rest.to_uppercase();
    if upper.contains("NOT NULL") {
        field.nullable = false;
    }
    if upper.contains("AUTO_INCREMENT") {
        field.is_auto_increment = true;
    }
    if upper.contains("PRIMARY KEY") {
        field.is_primary_key = true;
    }
    if let Some(captures) = DEFAULT_RE.captures(&rest) {
        field.default_value = Some(
            captures
                .get(1)
                .or_else(|| captures.get(2))
                .map_or(String::new(), |m| m.as_str().to_string()),
        );
    }
    if let Some(captures) = COMMENT_RE.captures(&rest) {
        field.comment = captures[1].to_string();
    }
    if field.field_type == "enum" && field.enum_values.is_none() && !field.comment.is_empty() {
        field.enum_values = mine_enum_values(&field.comment);
    }

    Some(field)
}

/// Find the index of the `)` matching the paren that closed at `start`,
/// honoring nesting and single-quoted strings
fn matching_paren(text: &str, start: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut in_string = false;
    for (offset, c) in text[start..].char_indices() {
        match c {
            '\'' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split a table body on commas at paren depth zero, outside strings
fn split_top_level(body: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_string = false;
    for c in body.chars() {
        match c {
            '\'' => {
                in_string = !in_string;
                current.push(c);
            }
            '(' if !in_string => {
                depth += 1;
                current.push(c);
            }
            ')' if !in_string => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if !in_string && depth == 0 => {
                segments.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        segments.push(current);
    }
    segments
}

/// Extract the identifiers inside the first parenthesized list of a segment
fn paren_list(segment: &str) -> Vec<String> {
    let Some(start) = segment.find('(') else {
        return Vec::new();
    };
    let Some(end) = segment[start..].find(')') else {
        return Vec::new();
    };
    segment[start + 1..start + end]
        .split(',')
        .map(|f| f.trim().trim_matches(['`', '"']).to_string())
        .filter(|f| !f.is_empty())
        .collect()
}

fn find_field_mut<'a>(table: &'a mut TableSchema, name: &str) -> Option<&'a mut FieldSpec> {
    table
        .fields
        .iter_mut()
        .find(|f| f.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_create_table() {
        let sql = "CREATE TABLE users (id BIGINT PRIMARY KEY AUTO_INCREMENT, username VARCHAR(50) NOT NULL) ENGINE=InnoDB;";
        let tables = parse_create_tables(sql);
        assert_eq!(tables.len(), 1);

        let table = &tables[0];
        assert_eq!(table.name, "users");
        assert_eq!(table.engine.as_deref(), Some("InnoDB"));
        assert_eq!(table.fields.len(), 2);

        let id = &table.fields[0];
        assert_eq!(id.name, "id");
        assert_eq!(id.field_type, "bigint");
        assert!(id.is_primary_key);
        assert!(id.is_auto_increment);

        let username = &table.fields[1];
        assert_eq!(username.name, "username");
        assert_eq!(username.length, Some(50));
        assert!(!username.nullable);
    }

    #[test]
    fn test_multi_line_create_table_with_keys() {
        let sql = r#"
CREATE TABLE `orders` (
  `id` BIGINT NOT NULL AUTO_INCREMENT COMMENT '主键',
  `order_no` VARCHAR(64) NOT NULL COMMENT '订单号',
  `user_id` BIGINT NOT NULL,
  `amount` DECIMAL(10,2) DEFAULT 0.00 COMMENT '金额',
  PRIMARY KEY (`id`),
  UNIQUE KEY `uk_order_no` (`order_no`),
  KEY `idx_user` (`user_id`),
  CONSTRAINT `fk_user` FOREIGN KEY (`user_id`) REFERENCES `users` (`id`)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COMMENT='订单表';
"#;
        let tables = parse_create_tables(sql);
        assert_eq!(tables.len(), 1);
        let table = &tables[0];

        assert_eq!(table.name, "orders");
        assert_eq!(table.comment, "订单表");
        assert_eq!(table.display_name, "订单表");
        assert_eq!(table.charset.as_deref(), Some("utf8mb4"));
        assert_eq!(table.fields.len(), 4);

        let amount = table.fields.iter().find(|f| f.name == "amount").unwrap();
        assert_eq!(amount.field_type, "decimal");
        assert_eq!(amount.length, Some(10));
        assert_eq!(amount.scale, Some(2));
        assert_eq!(amount.default_value.as_deref(), Some("0.00"));
        assert_eq!(amount.comment, "金额");

        let id = table.fields.iter().find(|f| f.name == "id").unwrap();
        assert!(id.is_primary_key);

        assert_eq!(table.indexes.len(), 3);
        assert_eq!(table.indexes[0].kind, IndexKind::Primary);
        assert_eq!(table.indexes[1].kind, IndexKind::Unique);
        assert!(table.indexes[1].is_unique);
        assert_eq!(table.indexes[1].fields, vec!["order_no"]);
        assert_eq!(table.indexes[2].kind, IndexKind::Index);

        assert_eq!(table.constraints.len(), 1);
        let fk = &table.constraints[0];
        assert_eq!(fk.kind, ConstraintKind::ForeignKey);
        assert_eq!(fk.column, "user_id");
        assert_eq!(fk.referenced_table.as_deref(), Some("users"));
        assert_eq!(fk.referenced_column.as_deref(), Some("id"));
    }

    #[test]
    fn test_enum_column_from_declaration() {
        let sql = "CREATE TABLE t (status ENUM('active','disabled') NOT NULL DEFAULT 'active');";
        let tables = parse_create_tables(sql);
        let status = &tables[0].fields[0];
        assert_eq!(status.field_type, "enum");
        assert_eq!(
            status.enum_values.as_deref(),
            Some(["active".to_string(), "disabled".to_string()].as_slice())
        );
        assert_eq!(status.default_value.as_deref(), Some("active"));
    }

    #[test]
    fn test_enum_values_mined_from_comment() {
        // Degenerate declaration with empty value list; falls back to comment
        let sql = "CREATE TABLE t (kind ENUM() COMMENT '类型（a、b）');";
        let tables = parse_create_tables(sql);
        let kind = &tables[0].fields[0];
        assert_eq!(kind.field_type, "enum");
        assert_eq!(
            kind.enum_values.as_deref(),
            Some(["a".to_string(), "b".to_string()].as_slice())
        );
    }

    #[test]
    fn test_multiple_statements() {
        let sql = "CREATE TABLE a (id INT); CREATE TABLE b (id INT);";
        let tables = parse_create_tables(sql);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].name, "a");
        assert_eq!(tables[1].name, "b");
    }

    #[test]
    fn test_commas_inside_strings_do_not_split() {
        let sql = "CREATE TABLE t (note VARCHAR(100) COMMENT 'a, b, and c', other INT);";
        let tables = parse_create_tables(sql);
        assert_eq!(tables[0].fields.len(), 2);
        assert_eq!(tables[0].fields[0].comment, "a, b, and c");
    }

    #[test]
    fn test_unique_column_constraint() {
        let sql = "CREATE TABLE t (email VARCHAR(100), UNIQUE (email));";
        let tables = parse_create_tables(sql);
        assert_eq!(tables[0].constraints.len(), 1);
        assert_eq!(tables[0].constraints[0].kind, ConstraintKind::Unique);
        assert_eq!(tables[0].constraints[0].column, "email");
    }

    #[test]
    fn test_unbalanced_statement_is_skipped() {
        let sql = "CREATE TABLE broken (id INT";
        assert!(parse_create_tables(sql).is_empty());
    }
}
