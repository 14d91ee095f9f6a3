//! Bearer-token verification: extracts the token from an `Authorization` header, resolves the
//! signing key by `kid` from a local file or a remote JWKS endpoint, verifies the signature and
//! standard time claims, and exposes the decoded claims (including scopes) to the caller.

use dashmap::DashMap;
use jsonwebtoken::jwk::{AlgorithmParameters, JwkSet};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

pub const AUTHORIZATION_HEADER: &str = "authorization";
pub const BEARER_PREFIX: &str = "bearer";

#[derive(Debug)]
pub enum JwtError {
    MissingToken,
    MalformedHeader(String),
    MissingKid,
    UnknownKid(String),
    UnsupportedAlgorithm,
    MalformedKey(String),
    KeyFetchFailed(String),
    TokenExpired,
    InvalidSignatureOrClaims(String),
}

impl JwtError {
    pub fn key_fetch_failed(msg: impl Into<String>) -> Self {
        Self::KeyFetchFailed(msg.into())
    }
}

impl Display for JwtError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::MissingToken => write!(f, "no bearer token present"),
            JwtError::MalformedHeader(msg) => write!(f, "malformed JWT header: {}", msg),
            JwtError::MissingKid => write!(f, "JWT header is missing 'kid'"),
            JwtError::UnknownKid(kid) => write!(f, "no JWK matches kid '{}'", kid),
            JwtError::UnsupportedAlgorithm => write!(f, "unsupported JWT signing algorithm"),
            JwtError::MalformedKey(msg) => write!(f, "malformed signing key: {}", msg),
            JwtError::KeyFetchFailed(msg) => write!(f, "failed to fetch signing keys: {}", msg),
            JwtError::TokenExpired => write!(f, "token has expired"),
            JwtError::InvalidSignatureOrClaims(msg) => {
                write!(f, "token signature or claims rejected: {}", msg)
            }
        }
    }
}

impl std::error::Error for JwtError {}

/// Where the verifier loads its [`JwkSet`] from. Resolved once per [`JwtVerifier`]; all `kid`s
/// seen at runtime are expected to live in the one set this source produces.
#[derive(Debug, Clone)]
pub enum KeySource {
    Jwks { url: String },
    LocalFile { path: String },
}

#[derive(Clone)]
struct DecodingKeyEntry {
    key: Arc<DecodingKey>,
    algorithm: Algorithm,
}

/// The subset of registered JWT claims the pipeline cares about, plus a pass-through for
/// everything else via `claims.get(...)` on the decoded value held by the caller.
#[derive(Debug, Clone)]
pub struct Claims {
    pub subject: Option<String>,
    pub client_id: Option<String>,
    pub scopes: Vec<String>,
    pub raw: Value,
}

impl Claims {
    fn from_value(value: Value) -> Self {
        let subject = value.get("sub").and_then(Value::as_str).map(String::from);
        let client_id = value
            .get("client_id")
            .or_else(|| value.get("clientId"))
            .and_then(Value::as_str)
            .map(String::from);
        let scopes = Self::scope_list(&value);
        Self {
            subject,
            client_id,
            scopes,
            raw: value,
        }
    }

    /// Scopes are carried either as a single space-delimited string (`"scope": "read write"`)
    /// or as a JSON array (`"scope": ["read", "write"]`); both encodings are accepted.
    fn scope_list(value: &Value) -> Vec<String> {
        match value.get("scope").or_else(|| value.get("scp")) {
            Some(Value::String(scope)) => scope
                .split_whitespace()
                .map(|s| s.to_string())
                .collect(),
            Some(Value::Array(scopes)) => scopes
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Extracts the token from a `"Bearer <token>"` authorization header value. Case-insensitive
/// on the scheme name, per RFC 6750.
pub fn extract_bearer_token(header_value: &str) -> Result<&str, JwtError> {
    let mut parts = header_value.splitn(2, ' ');
    let scheme = parts.next().unwrap_or("");
    let token = parts.next().map(str::trim).unwrap_or("");
    if scheme.to_lowercase() != BEARER_PREFIX || token.is_empty() {
        return Err(JwtError::MissingToken);
    }
    Ok(token)
}

/// Verifies bearer tokens against a set of JWKs, caching decoding keys by `kid` so repeated
/// requests don't re-parse key material.
pub struct JwtVerifier {
    key_source: KeySource,
    key_cache: DashMap<String, DecodingKeyEntry>,
    clock_skew_in_seconds: u64,
    http_client: reqwest::blocking::Client,
}

impl JwtVerifier {
    pub fn new(key_source: KeySource) -> Result<Self, JwtError> {
        Self::with_timeouts(key_source, 0, 5)
    }

    pub fn with_timeouts(
        key_source: KeySource,
        clock_skew_in_seconds: u64,
        request_timeout_in_seconds: u64,
    ) -> Result<Self, JwtError> {
        let http_client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(request_timeout_in_seconds))
            .build()
            .map_err(|e| JwtError::key_fetch_failed(e.to_string()))?;

        Ok(Self {
            key_source,
            key_cache: DashMap::new(),
            clock_skew_in_seconds,
            http_client,
        })
    }

    /// Extracts the bearer token from `authorization_header`, resolves its signing key and
    /// verifies the signature plus standard time claims (`exp`, `nbf`), returning the decoded
    /// claims on success.
    pub fn verify(&self, authorization_header: &str) -> Result<Claims, JwtError> {
        let token = extract_bearer_token(authorization_header)?;

        let header = decode_header(token).map_err(|e| JwtError::MalformedHeader(e.to_string()))?;

        let entry = self.decoding_key_for(header.kid.as_deref())?;

        let mut validation = Validation::new(entry.algorithm);
        validation.leeway = self.clock_skew_in_seconds;

        let token_data = decode::<Value>(token, &entry.key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::InvalidSignatureOrClaims(e.to_string()),
            }
        })?;

        Ok(Claims::from_value(token_data.claims))
    }

    /// Resolves a decoding key by `kid`. When the token carries no `kid`, falls back to the
    /// only configured key — but only if exactly one is configured; with zero or several keys
    /// available there's no way to tell which one applies, so that's a hard `MissingKid` error.
    fn decoding_key_for(&self, kid: Option<&str>) -> Result<DecodingKeyEntry, JwtError> {
        match kid {
            Some(kid) => {
                if let Some(entry) = self.key_cache.get(kid) {
                    return Ok(entry.clone());
                }

                let jwk_set = self.fetch_jwks()?;
                let jwk = jwk_set
                    .find(kid)
                    .ok_or_else(|| JwtError::UnknownKid(kid.to_string()))?;
                let entry = Self::decoding_key_from_jwk(jwk)?;
                self.key_cache.insert(kid.to_string(), entry.clone());
                Ok(entry)
            }
            None => {
                let jwk_set = self.fetch_jwks()?;
                match jwk_set.keys.as_slice() {
                    [only] => Self::decoding_key_from_jwk(only),
                    _ => Err(JwtError::MissingKid),
                }
            }
        }
    }

    fn fetch_jwks(&self) -> Result<JwkSet, JwtError> {
        match &self.key_source {
            KeySource::Jwks { url } => self
                .http_client
                .get(url)
                .send()
                .and_then(|resp| resp.json::<JwkSet>())
                .map_err(|e| JwtError::key_fetch_failed(e.to_string())),
            KeySource::LocalFile { path } => {
                let content = std::fs::read_to_string(path)
                    .map_err(|e| JwtError::key_fetch_failed(e.to_string()))?;
                serde_json::from_str(&content)
                    .map_err(|e| JwtError::key_fetch_failed(e.to_string()))
            }
        }
    }

    fn decoding_key_from_jwk(jwk: &jsonwebtoken::jwk::Jwk) -> Result<DecodingKeyEntry, JwtError> {
        match &jwk.algorithm {
            AlgorithmParameters::RSA(rsa_params) => {
                let key = DecodingKey::from_rsa_components(&rsa_params.n, &rsa_params.e)
                    .map_err(|e| JwtError::MalformedKey(e.to_string()))?;
                Ok(DecodingKeyEntry {
                    key: Arc::new(key),
                    algorithm: Algorithm::RS256,
                })
            }
            AlgorithmParameters::EllipticCurve(ec_params) => {
                let key = DecodingKey::from_ec_components(&ec_params.x, &ec_params.y)
                    .map_err(|e| JwtError::MalformedKey(e.to_string()))?;
                Ok(DecodingKeyEntry {
                    key: Arc::new(key),
                    algorithm: Algorithm::ES256,
                })
            }
            _ => Err(JwtError::UnsupportedAlgorithm),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn extracts_token_from_bearer_header() {
        let token = extract_bearer_token("Bearer abc.def.ghi").unwrap();
        assert_eq!(token, "abc.def.ghi");
    }

    #[test]
    fn scheme_match_is_case_insensitive() {
        let token = extract_bearer_token("bearer abc.def.ghi").unwrap();
        assert_eq!(token, "abc.def.ghi");
    }

    #[test]
    fn rejects_non_bearer_scheme() {
        assert!(matches!(
            extract_bearer_token("Basic dXNlcjpwYXNz"),
            Err(JwtError::MissingToken)
        ));
    }

    #[test]
    fn rejects_header_with_no_token() {
        assert!(matches!(
            extract_bearer_token("Bearer"),
            Err(JwtError::MissingToken)
        ));
    }

    #[test]
    fn scope_claim_accepts_space_delimited_string() {
        let claims = Claims::from_value(serde_json::json!({ "scope": "read:items write:items" }));
        assert_eq!(claims.scopes, vec!["read:items", "write:items"]);
    }

    #[test]
    fn scope_claim_accepts_json_array() {
        let claims = Claims::from_value(serde_json::json!({ "scp": ["read:items", "write:items"] }));
        assert_eq!(claims.scopes, vec!["read:items", "write:items"]);
    }

    #[test]
    fn missing_scope_claim_is_an_empty_list() {
        let claims = Claims::from_value(serde_json::json!({ "sub": "user-1" }));
        assert!(claims.scopes.is_empty());
        assert_eq!(claims.subject.as_deref(), Some("user-1"));
    }

    #[test]
    fn unknown_kid_is_rejected_without_network_access() {
        let verifier = JwtVerifier::new(KeySource::LocalFile {
            path: "/nonexistent/jwks.json".to_string(),
        })
        .unwrap();
        let result = verifier.decoding_key_for(Some("missing-kid"));
        assert!(matches!(result, Err(JwtError::KeyFetchFailed(_))));
    }

    #[test]
    fn missing_kid_without_reachable_keys_fails_fetch_before_reaching_fallback() {
        let verifier = JwtVerifier::new(KeySource::LocalFile {
            path: "/nonexistent/jwks.json".to_string(),
        })
        .unwrap();
        let result = verifier.decoding_key_for(None);
        assert!(matches!(result, Err(JwtError::KeyFetchFailed(_))));
    }
}
