//! Engine runtime configuration: everything the enforcement pipeline needs that isn't itself
//! part of the OpenAPI document, loaded from a JSON or YAML file or assembled in code.

use crate::spec_index::{parse_spec_document, SpecLoadError};
use crate::validator::RequestValidationSettings;
use serde::Deserialize;
use serde_json::Value;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ConfigError {
    Load(String),
    Parse(String),
}

impl ConfigError {
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Load(msg) => write!(f, "Failed to load configuration: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Failed to parse configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Controls for the request/response schema validator stages.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub enabled: bool,
    pub skip_body_validation: bool,
    pub body_parser_enabled: bool,
    pub validate_response: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            skip_body_validation: false,
            body_parser_enabled: true,
            validate_response: false,
        }
    }
}

impl ValidatorConfig {
    pub fn request_validation_settings(&self) -> RequestValidationSettings {
        RequestValidationSettings {
            skip_body_validation: self.skip_body_validation,
            body_parser_enabled: self.body_parser_enabled,
        }
    }
}

/// JWT verification knobs, independent of where the signing keys actually live.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JwtSecurityConfig {
    pub enabled: bool,
    pub jwk_server_url: Option<String>,
    pub jwk_server_path: Option<String>,
    pub local_key_file: Option<String>,
    pub audience: Option<String>,
    pub issuer: Option<String>,
    pub clock_skew_in_seconds: u64,
    pub request_timeout_in_seconds: u64,
}

impl Default for JwtSecurityConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            jwk_server_url: None,
            jwk_server_path: None,
            local_key_file: None,
            audience: None,
            issuer: None,
            clock_skew_in_seconds: 0,
            request_timeout_in_seconds: 5,
        }
    }
}

impl JwtSecurityConfig {
    /// Builds the full JWKS url from `jwk_server_url` + `jwk_server_path`, when both are set.
    pub fn jwks_url(&self) -> Option<String> {
        let url = self.jwk_server_url.as_deref()?;
        match self.jwk_server_path.as_deref() {
            Some(path) => Some(format!("{}{}", url.trim_end_matches('/'), path)),
            None => Some(url.to_string()),
        }
    }
}

/// Top-level `security` block: whether the JWT stage runs at all, and whether it enforces
/// scopes once a token decodes successfully.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub enable_verify_jwt: bool,
    pub enable_verify_scope: bool,
    pub jwt: JwtSecurityConfig,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_verify_jwt: false,
            enable_verify_scope: false,
            jwt: JwtSecurityConfig::default(),
        }
    }
}

/// The engine's full runtime configuration, assembled once at startup and shared read-only
/// across every exchange.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub validator: ValidatorConfig,
    pub security: SecurityConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            validator: ValidatorConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_file(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::load(e.to_string()))?;
        let value = parse_spec_document(&content).map_err(|e: SpecLoadError| {
            ConfigError::parse(e.to_string())
        })?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        // `openapi-security` is the historical block name; `security` is accepted as a
        // shorthand for configs that only ever set the security section.
        let security_value = value.get("openapi-security").or_else(|| value.get("security"));

        let security = match security_value {
            Some(section) => serde_json::from_value(section.clone())
                .map_err(|e| ConfigError::parse(e.to_string()))?,
            None => SecurityConfig::default(),
        };

        let validator = match value.get("validator") {
            Some(section) => serde_json::from_value(section.clone())
                .map_err(|e| ConfigError::parse(e.to_string()))?,
            None => ValidatorConfig::default(),
        };

        Ok(Self {
            validator,
            security,
        })
    }
}
