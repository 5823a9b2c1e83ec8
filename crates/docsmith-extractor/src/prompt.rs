//! Prompt engineering for document extraction
//!
//! One fixed system instruction per target kind, plus framing for the chunk
//! content. The instruction pins the exact JSON shape the response parser
//! decodes, so the recovery layers only have to deal with wrapping noise,
//! not schema drift.

use docsmith_domain::TargetKind;

/// System instruction for the given target kind
pub fn system_instruction(kind: TargetKind) -> &'static str {
    match kind {
        TargetKind::Api => API_EXTRACTION_INSTRUCTIONS,
        TargetKind::Schema => SCHEMA_EXTRACTION_INSTRUCTIONS,
    }
}

/// Frame one chunk of document content for the user turn
pub fn chunk_prompt(chunk_text: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str("Document to analyze:\n");
    prompt.push_str("---\n");
    prompt.push_str(chunk_text);
    prompt.push_str("\n---\n\n");
    prompt.push_str(OUTPUT_FORMAT_REMINDER);
    prompt
}

const API_EXTRACTION_INSTRUCTIONS: &str = r#"You extract API endpoint definitions from technical documents.
The document may mix Markdown, tables, code blocks and prose, in English or Chinese.

Return a JSON object of this exact shape:

{
  "endpoints": [
    {
      "name": "human-readable endpoint name",
      "method": "GET|POST|PUT|PATCH|DELETE|HEAD|OPTIONS",
      "path": "/request/path",
      "description": "short description or null",
      "parameters": [
        {
          "name": "parameter name",
          "type": "string|integer|number|boolean|array|object",
          "required": true,
          "description": "parameter description",
          "location": "query|path|body"
        }
      ],
      "responses": [
        { "status_code": "200", "example": "verbatim example payload or null" }
      ]
    }
  ],
  "confidence": 0.0
}

Rules:
- Extract every endpoint the document defines; never invent endpoints
- Method must be uppercase; keep the path exactly as written
- Preserve the document's own parameter names and descriptions
- "confidence" is your overall extraction reliability in [0, 1]"#;

const SCHEMA_EXTRACTION_INSTRUCTIONS: &str = r#"You extract database table definitions from technical documents.
The document may mix Markdown, SQL DDL, ER diagrams, tables and prose, in English or Chinese.

Return a JSON object of this exact shape:

{
  "tables": [
    {
      "name": "table_name",
      "display_name": "human-readable title",
      "comment": "table comment",
      "engine": "storage engine or null",
      "charset": "character set or null",
      "fields": [
        {
          "name": "column_name",
          "type": "declared type, lowercase",
          "length": null,
          "scale": null,
          "nullable": true,
          "is_primary_key": false,
          "is_auto_increment": false,
          "default_value": null,
          "comment": "column comment",
          "enum_values": null
        }
      ],
      "indexes": [
        { "name": "index_name", "type": "INDEX|UNIQUE|PRIMARY|FULLTEXT|FOREIGN", "fields": ["column"], "is_unique": false }
      ],
      "constraints": [
        { "type": "FOREIGN_KEY|UNIQUE", "column": "column", "referenced_table": null, "referenced_column": null }
      ]
    }
  ],
  "confidence": 0.0
}

Rules:
- Extract every table the document defines; never invent tables
- Keep declared lengths, defaults and comments exactly as written
- For enumeration columns, list candidate values in "enum_values"
- "confidence" is your overall extraction reliability in [0, 1]"#;

const OUTPUT_FORMAT_REMINDER: &str =
    "Return ONLY the JSON object described in the instructions, with no markdown code fences and no explanations.";
