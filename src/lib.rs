//! API contract enforcement pipeline: OpenAPI/Swagger request and response
//! validation, JWT verification, scope checks, and path routing.

pub mod audit;
pub mod cache;
pub mod config;
pub mod converter;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod path;
pub mod router;
pub mod spec_index;
pub mod status;
pub mod traverser;
pub mod types;
pub mod validator;

pub(crate) const PATH_SEPARATOR: &str = "/";
pub(crate) const TILDE: &str = "~";
pub(crate) const ENCODED_TILDE: &str = "~0";
pub(crate) const ENCODED_BACKSLASH: &str = "~1";

pub(crate) const OPENAPI_FIELD: &str = "openapi";
pub(crate) const SWAGGER_FIELD: &str = "swagger";
pub(crate) const PATHS_FIELD: &str = "paths";
pub(crate) const NAME_FIELD: &str = "name";
pub(crate) const PARAMETERS_FIELD: &str = "parameters";
pub(crate) const REF_FIELD: &str = "$ref";
pub(crate) const SCHEMA_FIELD: &str = "schema";
pub(crate) const IN_FIELD: &str = "in";
pub(crate) const REQUIRED_FIELD: &str = "required";
pub(crate) const CONTENT_FIELD: &str = "content";
pub(crate) const REQUEST_BODY_FIELD: &str = "requestBody";
pub(crate) const SECURITY_FIELD: &str = "security";
pub(crate) const RESPONSES_FIELD: &str = "responses";
pub(crate) const DEFAULT_RESPONSE_FIELD: &str = "default";
pub(crate) const SCOPES_FIELD: &str = "scopes";
