//! Entity collection from Mermaid-style diagram blocks
//!
//! Diagrams declare that an entity exists, not what it contains, so every
//! collected entity is synthesized into a skeleton schema: an auto-increment
//! primary key, a few domain-guessed fields keyed off the entity name, and
//! created_at/updated_at timestamps. Downstream importers expect a non-empty,
//! well-formed field list even when the source only drew a box.

use docsmith_domain::{FieldSpec, IndexKind, IndexSpec, TableSchema};
use once_cell::sync::Lazy;
use regex::Regex;

static ER_RELATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([A-Za-z_][\w-]*)\s*[|}o]{1,2}(?:--|\.\.)[|{o]{1,2}\s*([A-Za-z_][\w-]*)\s*:\s*\S")
        .unwrap()
});

static FLOW_NODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w+)\s*[\[(]+\s*([^\])]+?)\s*[\])]+").unwrap());

static SUBGRAPH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*subgraph\s+(.+)$").unwrap());

const DATA_SECTION_MARKERS: &[&str] = &["数据", "存储", "data", "storage", "db", "database"];

/// Whether a fenced block looks like a diagram
pub(crate) fn is_diagram(tag: &str, body: &str) -> bool {
    let tag = tag.trim().to_lowercase();
    if tag == "mermaid" {
        return true;
    }
    let head = body.trim_start().to_lowercase();
    head.starts_with("erdiagram")
        || head.starts_with("graph ")
        || head.starts_with("flowchart")
}

/// Collect entity names declared by a diagram block, in input order
///
/// Names come from ER relation lines (`A ||--o{ B : label`) or, inside a
/// subgraph labeled as a data/storage section, from bracketed flow nodes.
/// Names are normalized to lowercase with spaces collapsed to underscores.
pub(crate) fn collect_entities(body: &str) -> Vec<String> {
    let mut seen = Vec::new();
    let mut push = |raw: &str| {
        let name = normalize_entity(raw);
        if !name.is_empty() && !seen.contains(&name) {
            seen.push(name);
        }
    };

    let mut in_data_subgraph = false;
    for line in body.lines() {
        let trimmed = line.trim();

        if let Some(captures) = SUBGRAPH_RE.captures(trimmed) {
            let label = captures[1].to_lowercase();
            in_data_subgraph = DATA_SECTION_MARKERS
                .iter()
                .any(|marker| label.contains(marker));
            continue;
        }
        if trimmed == "end" {
            in_data_subgraph = false;
            continue;
        }

        if let Some(captures) = ER_RELATION_RE.captures(trimmed) {
            push(&captures[1]);
            push(&captures[2]);
            continue;
        }

        if in_data_subgraph {
            if let Some(captures) = FLOW_NODE_RE.captures(trimmed) {
                push(captures[2].trim_matches(['"', '\'', '(', ')']));
            }
        }
    }

    seen
}

fn normalize_entity(raw: &str) -> String {
    raw.trim().to_lowercase().replace([' ', '\t'], "_")
}

/// Synthesize a skeleton schema for an entity that a diagram only names
pub(crate) fn skeleton_table(name: &str) -> TableSchema {
    let mut table = TableSchema::new(name);

    let mut id = FieldSpec::new("id", "bigint");
    id.nullable = false;
    id.is_primary_key = true;
    id.is_auto_increment = true;
    id.comment = "primary key".to_string();
    table.fields.push(id);

    for field in guessed_fields(&name.to_lowercase()) {
        table.fields.push(field);
    }

    let mut created = FieldSpec::new("created_at", "datetime");
    created.nullable = false;
    created.default_value = Some("CURRENT_TIMESTAMP".to_string());
    created.comment = "creation time".to_string();
    table.fields.push(created);

    let mut updated = FieldSpec::new("updated_at", "datetime");
    updated.comment = "last update time".to_string();
    table.fields.push(updated);

    table.indexes.push(IndexSpec {
        name: "PRIMARY".to_string(),
        kind: IndexKind::Primary,
        fields: vec!["id".to_string()],
        is_unique: true,
    });

    table
}

/// Domain-guessed fields keyed off keywords in the entity name
fn guessed_fields(name: &str) -> Vec<FieldSpec> {
    let contains_any = |keywords: &[&str]| keywords.iter().any(|k| name.contains(k));

    if contains_any(&["user", "用户", "member", "account"]) {
        let mut username = FieldSpec::new("username", "varchar");
        username.length = Some(50);
        username.nullable = false;
        username.comment = "login name".to_string();
        let mut email = FieldSpec::new("email", "varchar");
        email.length = Some(100);
        email.comment = "email address".to_string();
        return vec![username, email];
    }

    if contains_any(&["order", "订单"]) {
        let mut number = FieldSpec::new("order_number", "varchar");
        number.length = Some(50);
        number.nullable = false;
        number.comment = "order number".to_string();
        let mut amount = FieldSpec::new("total_amount", "decimal");
        amount.length = Some(10);
        amount.scale = Some(2);
        amount.comment = "total amount".to_string();
        return vec![number, amount];
    }

    if contains_any(&["product", "商品", "goods", "item"]) {
        let mut product_name = FieldSpec::new("name", "varchar");
        product_name.length = Some(100);
        product_name.nullable = false;
        product_name.comment = "product name".to_string();
        let mut price = FieldSpec::new("price", "decimal");
        price.length = Some(10);
        price.scale = Some(2);
        price.comment = "unit price".to_string();
        return vec![product_name, price];
    }

    let mut generic_name = FieldSpec::new("name", "varchar");
    generic_name.length = Some(100);
    generic_name.comment = "name".to_string();
    let mut description = FieldSpec::new("description", "varchar");
    description.length = Some(255);
    description.comment = "description".to_string();
    vec![generic_name, description]
}
