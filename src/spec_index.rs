//! Process-wide, build-once-read-many view of a loaded OpenAPI/Swagger document: the resolved
//! schema validator, the declared base path, the names of its oauth2 security schemes, and a
//! path router built from every path template it declares.

use crate::error::ValidationErrorType;
use crate::path::NormalisedPath;
use crate::router::{PathRouter, PathTemplate};
use crate::types::json_path::JsonPath;
use crate::types::operation::Operation;
use crate::validator::OpenApiPayloadValidator;
use crate::{OPENAPI_FIELD, PATHS_FIELD};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

#[derive(Debug)]
pub enum SpecLoadError {
    Json(serde_json::Error),
    Yaml(serde_yaml::Error),
}

impl Display for SpecLoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SpecLoadError::Json(e) => write!(f, "Failed to parse specification as JSON: {}", e),
            SpecLoadError::Yaml(e) => write!(f, "Failed to parse specification as YAML: {}", e),
        }
    }
}

impl std::error::Error for SpecLoadError {}

/// Parses a spec document, sniffing JSON vs. YAML by its first non-whitespace character.
pub fn parse_spec_document(content: &str) -> Result<Value, SpecLoadError> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        serde_json::from_str(content).map_err(SpecLoadError::Json)
    } else {
        serde_yaml::from_str(content).map_err(SpecLoadError::Yaml)
    }
}

#[derive(Debug)]
pub enum RoutingError {
    /// No declared path template matches the request path.
    PathNotFound,
    /// A path template matches, but not for the requested method.
    MethodNotAllowed,
}

impl Display for RoutingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RoutingError::PathNotFound => write!(f, "invalid request path"),
            RoutingError::MethodNotAllowed => write!(f, "method not allowed"),
        }
    }
}

impl std::error::Error for RoutingError {}

/// A resolved match: the spec path template, the lowercased method, the operation object and
/// the normalised request path it was matched from.
pub struct OperationHandle {
    pub path_template: PathTemplate,
    pub method: String,
    pub operation: Arc<Operation>,
    pub normalised_path: NormalisedPath,
}

impl OperationHandle {
    /// `"<normalisedPath>@<method>"`, the audit context's `endpoint` value.
    pub fn endpoint(&self) -> String {
        format!("{}@{}", self.normalised_path.normalised(), self.method)
    }
}

pub struct SpecIndex {
    validator: OpenApiPayloadValidator,
    base_path: String,
    oauth2_security_schemes: HashSet<String>,
    router: PathRouter,
}

impl SpecIndex {
    pub fn build(spec: Value) -> Result<Self, ValidationErrorType> {
        let base_path = Self::extract_base_path(&spec);
        let oauth2_security_schemes = Self::extract_oauth2_schemes(&spec);
        let router = Self::build_router(&spec);
        let validator = OpenApiPayloadValidator::new(spec)?;

        Ok(Self {
            validator,
            base_path,
            oauth2_security_schemes,
            router,
        })
    }

    pub fn validator(&self) -> &OpenApiPayloadValidator {
        &self.validator
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn oauth2_security_schemes(&self) -> &HashSet<String> {
        &self.oauth2_security_schemes
    }

    fn extract_base_path(spec: &Value) -> String {
        if let Some(base_path) = spec.get("basePath").and_then(Value::as_str) {
            return base_path.to_string();
        }

        if let Some(first_server_url) = spec
            .get("servers")
            .and_then(Value::as_array)
            .and_then(|servers| servers.first())
            .and_then(|server| server.get("url"))
            .and_then(Value::as_str)
        {
            return Self::path_of_url(first_server_url);
        }

        String::new()
    }

    /// Extracts the path component of a server URL without pulling in a URL-parsing crate:
    /// skip past the scheme/authority (`://` then the next `/`), the rest is the path.
    fn path_of_url(url: &str) -> String {
        match url.find("://") {
            Some(scheme_end) => {
                let after_scheme = &url[scheme_end + 3..];
                match after_scheme.find('/') {
                    Some(authority_end) => after_scheme[authority_end..].to_string(),
                    None => String::new(),
                }
            }
            None if url.starts_with('/') => url.to_string(),
            None => String::new(),
        }
    }

    fn extract_oauth2_schemes(spec: &Value) -> HashSet<String> {
        let schemes = spec
            .get("components")
            .and_then(|components| components.get("securitySchemes"))
            .or_else(|| spec.get("securityDefinitions"));

        let Some(schemes) = schemes.and_then(Value::as_object) else {
            return HashSet::new();
        };

        schemes
            .iter()
            .filter(|(_, definition)| {
                definition.get("type").and_then(Value::as_str) == Some("oauth2")
            })
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn build_router(spec: &Value) -> PathRouter {
        let mut router = PathRouter::new();
        if let Some(paths) = spec.get(PATHS_FIELD).and_then(Value::as_object) {
            for path_text in paths.keys() {
                router.add_template(PathTemplate::new(path_text.as_str()));
            }
        }
        router
    }

    /// Resolves a raw request path and method to an [`OperationHandle`], distinguishing a
    /// wholly-unmatched path (404) from a matched path with an undeclared method (405).
    pub fn find_operation_handle(
        &self,
        raw_path: &str,
        method: &str,
    ) -> Result<OperationHandle, RoutingError> {
        let normalised_path = NormalisedPath::new(raw_path, &self.base_path);
        let template = self
            .router
            .find_matching_api_path(&normalised_path)
            .ok_or(RoutingError::PathNotFound)?
            .clone();

        let method = method.to_lowercase();
        let spec = self.validator.traverser().specification();
        let operation_value = spec
            .get(PATHS_FIELD)
            .and_then(|paths| paths.get(template.text()))
            .and_then(|path_object| path_object.get(&method))
            .ok_or(RoutingError::MethodNotAllowed)?;

        let mut json_path = JsonPath::new();
        json_path.add(PATHS_FIELD).add(template.text()).add(&method);
        let operation = Arc::new(Operation {
            data: operation_value.clone(),
            path: json_path,
        });

        Ok(OperationHandle {
            path_template: template,
            method,
            operation,
            normalised_path,
        })
    }

    pub fn openapi_version(&self) -> Option<&str> {
        self.validator
            .traverser()
            .specification()
            .get(OPENAPI_FIELD)
            .and_then(Value::as_str)
    }
}
