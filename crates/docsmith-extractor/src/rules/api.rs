//! Rule-based extraction of API endpoints from Markdown documents
//!
//! Recognized structure:
//! - endpoint headings: `#### <name> - <METHOD> <path>`
//! - bare endpoint lines: `<METHOD> <path>`
//! - the first following prose line as the endpoint description
//! - request-section JSON code blocks, one body parameter per top-level key
//! - Markdown parameter tables with Chinese or English headers

use super::{
    detect_table_header, is_affirmative, is_table_divider, split_table_row, ColumnMap, ScanState,
};
use docsmith_domain::{ApiEndpoint, EndpointParameter, HttpMethod, ParameterLocation};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static HEADING_ENDPOINT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#{1,4}\s*(.+?)\s*[-—–]\s*(GET|POST|PUT|PATCH|DELETE|HEAD|OPTIONS)\s+(\S+)\s*$")
        .unwrap()
});

static BARE_ENDPOINT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(GET|POST|PUT|PATCH|DELETE|HEAD|OPTIONS)\s+(/\S*)\s*$").unwrap());

/// Which document section the scanner is currently in, tracked so JSON code
/// blocks are only mined for parameters inside request sections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Request,
    Response,
    Other,
}

struct ApiScanner {
    endpoints: Vec<ApiEndpoint>,
    current: Option<ApiEndpoint>,
    state: ScanState,
    section: Section,
    columns: Option<ColumnMap>,
    block: Vec<String>,
}

/// Extract endpoints from a document, deterministically and in input order
pub fn extract_endpoints(text: &str) -> Vec<ApiEndpoint> {
    let mut scanner = ApiScanner {
        endpoints: Vec::new(),
        current: None,
        state: ScanState::Default,
        section: Section::Other,
        columns: None,
        block: Vec::new(),
    };

    for line in text.lines() {
        scanner.step(line);
    }
    scanner.finish()
}

impl ApiScanner {
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

        if trimmed.starts_with("```") {
            self.state = ScanState::InCodeBlock;
            self.block.clear();
            return;
        }

        if let Some(cells) = split_table_row(trimmed) {
            self.step_table_row(&cells);
            return;
        }
        if self.state == ScanState::InParameterTable {
            // Any non-row line ends the table
            self.state = ScanState::Default;
            self.columns = None;
        }

        if let Some(captures) = HEADING_ENDPOINT_RE.captures(trimmed) {
            if let Some(method) = HttpMethod::parse(&captures[2]) {
                self.start_endpoint(captures[1].trim(), method, captures[3].trim());
                return;
            }
        }

        if let Some(captures) = BARE_ENDPOINT_RE.captures(trimmed) {
            if let Some(method) = HttpMethod::parse(&captures[1]) {
                let path = captures[2].trim();
                self.start_endpoint(path, method, path);
                return;
            }
        }

        if trimmed.starts_with('#') {
            self.section = section_of(trimmed);
            return;
        }

        if let Some(section) = section_marker(trimmed) {
            self.section = section;
            return;
        }

        if !trimmed.is_empty() {
            if let Some(current) = self.current.as_mut() {
                if current.description.is_none() {
                    current.description = Some(trimmed.to_string());
                }
            }
        }
    }

    fn step_table_row(&mut self, cells: &[String]) {
        if is_table_divider(cells) {
            return;
        }
        if let Some(map) = detect_table_header(cells) {
            self.columns = Some(map);
            self.state = ScanState::InParameterTable;
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

        let cell = |idx: Option<usize>| idx.and_then(|i| cells.get(i)).cloned().unwrap_or_default();
        let parameter = EndpointParameter {
            name: name.clone(),
            param_type: {
                let t = cell(map.type_idx).to_lowercase();
                if t.is_empty() { "string".to_string() } else { t }
            },
            required: map
                .required_idx
                .and_then(|i| cells.get(i))
                .map(|c| is_affirmative(c))
                .unwrap_or(false),
            description: cell(map.desc_idx),
            location: ParameterLocation::Query,
        };
        push_parameter(current, parameter);
    }

    fn start_endpoint(&mut self, name: &str, method: HttpMethod, path: &str) {
        self.flush();
        self.current = Some(ApiEndpoint::new(name, method, path));
        self.section = Section::Request;
    }

    fn close_code_block(&mut self) {
        self.state = ScanState::Default;
        if self.section != Section::Request {
            self.block.clear();
            return;
        }
        let body = self.block.join("\n");
        self.block.clear();
        if let Some(current) = self.current.as_mut() {
            for parameter in parameters_from_json(&body) {
                push_parameter(current, parameter);
            }
        }
    }

    fn flush(&mut self) {
        if let Some(endpoint) = self.current.take() {
            self.endpoints.push(endpoint);
        }
    }

    fn finish(mut self) -> Vec<ApiEndpoint> {
        self.flush();
        self.endpoints
    }
}

/// Classify a heading as a request/response section marker
fn section_of(heading: &str) -> Section {
    section_marker(heading).unwrap_or(Section::Other)
}

fn section_marker(line: &str) -> Option<Section> {
    let lowered = line.to_lowercase();
    if lowered.contains("请求参数")
        || lowered.contains("请求示例")
        || lowered.contains("请求体")
        || lowered.contains("request")
    {
        return Some(Section::Request);
    }
    if lowered.contains("响应") || lowered.contains("返回") || lowered.contains("response") {
        return Some(Section::Response);
    }
    None
}

/// Derive one body parameter per top-level key of a JSON object
fn parameters_from_json(body: &str) -> Vec<EndpointParameter> {
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body.trim()) else {
        return Vec::new();
    };
    map.iter()
        .map(|(key, value)| EndpointParameter {
            name: key.clone(),
            param_type: json_kind(value).to_string(),
            required: true,
            description: String::new(),
            location: ParameterLocation::Body,
        })
        .collect()
}

/// Runtime kind of a JSON value, as a parameter type token
fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null | Value::String(_) => "string",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Append a parameter unless one with the same name is already present
fn push_parameter(endpoint: &mut ApiEndpoint, parameter: EndpointParameter) {
    let key = parameter.name.to_lowercase();
    if !endpoint
        .parameters
        .iter()
        .any(|p| p.name.to_lowercase() == key)
    {
        endpoint.parameters.push(parameter);
    }
}
