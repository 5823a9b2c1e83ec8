//! API endpoint descriptors extracted from documentation

use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP method of an extracted endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
    /// HEAD
    Head,
    /// OPTIONS
    Options,
}

impl HttpMethod {
    /// Parse a method token, case-insensitively
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "PATCH" => Some(Self::Patch),
            "DELETE" => Some(Self::Delete),
            "HEAD" => Some(Self::Head),
            "OPTIONS" => Some(Self::Options),
            _ => None,
        }
    }

    /// Canonical uppercase spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a parameter is carried on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// Query string parameter
    Query,
    /// Path segment parameter
    Path,
    /// Request body field
    Body,
}

impl Default for ParameterLocation {
    fn default() -> Self {
        ParameterLocation::Query
    }
}

/// A single request parameter of an endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointParameter {
    /// Parameter name
    pub name: String,

    /// Declared type ("string", "integer", ...)
    #[serde(rename = "type", default)]
    pub param_type: String,

    /// Whether the parameter is mandatory
    #[serde(default = "default_required")]
    pub required: bool,

    /// Free-text description
    #[serde(default)]
    pub description: String,

    /// Where the parameter is carried
    #[serde(default)]
    pub location: ParameterLocation,
}

fn default_required() -> bool {
    true
}

/// An example response of an endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointResponse {
    /// HTTP status code, kept as text ("200", "404")
    #[serde(alias = "statusCode")]
    pub status_code: String,

    /// Example payload, verbatim
    #[serde(default)]
    pub example: Option<String>,
}

/// A structured API endpoint descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEndpoint {
    /// Human-readable endpoint name
    pub name: String,

    /// HTTP method
    pub method: HttpMethod,

    /// Request path (e.g. "/api/v1/auth/login")
    pub path: String,

    /// Short description, when the document provides one
    #[serde(default)]
    pub description: Option<String>,

    /// Ordered request parameters
    #[serde(default)]
    pub parameters: Vec<EndpointParameter>,

    /// Example responses
    #[serde(default)]
    pub responses: Vec<EndpointResponse>,
}

impl ApiEndpoint {
    /// Create an endpoint with no parameters or responses
    pub fn new(name: impl Into<String>, method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method,
            path: path.into(),
            description: None,
            parameters: Vec::new(),
            responses: Vec::new(),
        }
    }

    /// Case-insensitive identity key: `(method, path)`
    ///
    /// Two endpoints with the same key are the same endpoint for
    /// deduplication purposes.
    pub fn identity_key(&self) -> String {
        format!("{} {}", self.method.as_str(), self.path.trim().to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_method_parse_case_insensitive() {
        assert_eq!(HttpMethod::parse("post"), Some(HttpMethod::Post));
        assert_eq!(HttpMethod::parse(" GET "), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::parse("FETCH"), None);
    }

    #[test]
    fn test_method_serde_uppercase() {
        let json = serde_json::to_string(&HttpMethod::Delete).unwrap();
        assert_eq!(json, "\"DELETE\"");
        let back: HttpMethod = serde_json::from_str("\"OPTIONS\"").unwrap();
        assert_eq!(back, HttpMethod::Options);
    }

    #[test]
    fn test_identity_key_ignores_path_case() {
        let a = ApiEndpoint::new("Login", HttpMethod::Post, "/API/v1/Login");
        let b = ApiEndpoint::new("login v2", HttpMethod::Post, "/api/v1/login");
        assert_eq!(a.identity_key(), b.identity_key());
    }

    #[test]
    fn test_identity_key_distinguishes_method() {
        let a = ApiEndpoint::new("list", HttpMethod::Get, "/users");
        let b = ApiEndpoint::new("create", HttpMethod::Post, "/users");
        assert_ne!(a.identity_key(), b.identity_key());
    }

    #[test]
    fn test_parameter_defaults() {
        let json = r#"{"name": "username"}"#;
        let p: EndpointParameter = serde_json::from_str(json).unwrap();
        assert!(p.required);
        assert_eq!(p.location, ParameterLocation::Query);
        assert!(p.param_type.is_empty());
    }

    proptest! {
        #[test]
        fn method_round_trips_through_parse(m in prop_oneof![
            Just(HttpMethod::Get), Just(HttpMethod::Post), Just(HttpMethod::Put),
            Just(HttpMethod::Patch), Just(HttpMethod::Delete), Just(HttpMethod::Head),
            Just(HttpMethod::Options),
        ]) {
            prop_assert_eq!(HttpMethod::parse(m.as_str()), Some(m));
        }
    }
}
