use crate::audit::AuditKey;
use crate::jwt::{JwtError, JwtVerifier};
use crate::middleware::{ExchangeCtx, Stage, StageOutcome};
use crate::router::PathRouter;
use crate::spec_index::{RoutingError, SpecIndex};
use crate::status::{ErrorCode, Status};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

const SCOPE_TOKEN_HEADER: &str = "x-scope-token";

/// The JWT+Scope middleware: verifies the primary bearer token, then — when the spec is
/// OpenAPI 3 and scope enforcement is enabled — resolves the operation (if the spec-match
/// stage hasn't already), verifies an optional secondary scope token, and checks the
/// operation's required scopes against whichever token carries them.
pub struct JwtVerifyStage {
    verifier: Arc<JwtVerifier>,
    spec_index: Arc<SpecIndex>,
    enable_verify_scope: bool,
}

impl JwtVerifyStage {
    pub fn new(
        verifier: Arc<JwtVerifier>,
        spec_index: Arc<SpecIndex>,
        enable_verify_scope: bool,
    ) -> Self {
        Self {
            verifier,
            spec_index,
            enable_verify_scope,
        }
    }

    /// The scope list of the first security requirement (operation-level, falling back to
    /// global) that references one of the spec's declared oauth2 schemes.
    fn spec_scopes_for(
        operation: &Value,
        global_spec: &Value,
        oauth2_schemes: &HashSet<String>,
    ) -> Vec<String> {
        let security = operation
            .get("security")
            .and_then(Value::as_array)
            .or_else(|| global_spec.get("security").and_then(Value::as_array));

        let Some(security) = security else {
            return Vec::new();
        };

        for requirement in security {
            let Some(requirement) = requirement.as_object() else {
                continue;
            };
            for (scheme_name, scopes) in requirement {
                if oauth2_schemes.contains(scheme_name) {
                    return scopes
                        .as_array()
                        .map(|scopes| {
                            scopes
                                .iter()
                                .filter_map(Value::as_str)
                                .map(String::from)
                                .collect()
                        })
                        .unwrap_or_default();
                }
            }
        }
        Vec::new()
    }

    /// Any-of match: an empty `spec_scopes` list always passes; otherwise at least one
    /// required scope must appear in the presented list.
    fn scopes_satisfied(spec_scopes: &[String], presented: &[String]) -> bool {
        spec_scopes.is_empty() || spec_scopes.iter().any(|scope| presented.contains(scope))
    }
}

impl<T> Stage<T> for JwtVerifyStage {
    fn handle(&self, ctx: &mut ExchangeCtx<T>) -> StageOutcome {
        let auth_header = match ctx
            .request
            .headers()
            .get(http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
        {
            Some(header) => header.to_string(),
            None => {
                return StageOutcome::Finalize(Status::new(
                    ErrorCode::MissingAuthToken,
                    "no Authorization header present",
                ));
            }
        };

        let claims = match self.verifier.verify(&auth_header) {
            Ok(claims) => claims,
            Err(JwtError::MissingToken) => {
                return StageOutcome::Finalize(Status::new(
                    ErrorCode::MissingAuthToken,
                    "Authorization header did not carry a bearer token",
                ));
            }
            Err(JwtError::TokenExpired) => {
                return StageOutcome::Finalize(Status::new(
                    ErrorCode::AuthTokenExpired,
                    "auth token has expired",
                ));
            }
            Err(e) => {
                return StageOutcome::Finalize(Status::new(ErrorCode::InvalidAuthToken, e.to_string()));
            }
        };

        ctx.audit
            .insert(AuditKey::ClientId, claims.client_id.clone().unwrap_or_default());
        ctx.audit
            .insert(AuditKey::UserId, claims.subject.clone().unwrap_or_default());
        ctx.audit.insert(AuditKey::SubjectClaims, claims.raw.clone());

        let is_openapi3 = self.spec_index.openapi_version().is_some();
        if !(self.enable_verify_scope && is_openapi3) {
            ctx.scopes = Some(claims.scopes);
            return StageOutcome::Forward;
        }

        if ctx.operation_handle.is_none() {
            let path = ctx.request.uri().path().to_string();
            let method = ctx.request.method().as_str().to_string();
            match self.spec_index.find_operation_handle(&path, &method) {
                Ok(handle) => {
                    ctx.path_params =
                        PathRouter::capture_params(&handle.path_template, &handle.normalised_path);
                    ctx.audit.insert(AuditKey::Endpoint, handle.endpoint());
                    ctx.audit
                        .insert(AuditKey::Operation, handle.path_template.text().to_string());
                    ctx.operation_handle = Some(handle);
                }
                Err(RoutingError::PathNotFound) => {
                    return StageOutcome::Finalize(Status::new(
                        ErrorCode::InvalidRequestPath,
                        format!("no operation matches path '{}'", path),
                    ));
                }
                Err(RoutingError::MethodNotAllowed) => {
                    return StageOutcome::Finalize(Status::new(
                        ErrorCode::MethodNotAllowed,
                        format!("method '{}' is not declared for path '{}'", method, path),
                    ));
                }
            }
        }

        let scope_token_scopes = match ctx
            .request
            .headers()
            .get(SCOPE_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
        {
            Some(scope_header) => match self.verifier.verify(scope_header) {
                Ok(scope_claims) => {
                    ctx.audit.insert(
                        AuditKey::ScopeClientId,
                        scope_claims.client_id.clone().unwrap_or_default(),
                    );
                    ctx.audit
                        .insert(AuditKey::AccessClaims, scope_claims.raw.clone());
                    Some(scope_claims.scopes)
                }
                Err(JwtError::TokenExpired) => {
                    return StageOutcome::Finalize(Status::new(
                        ErrorCode::ScopeTokenExpired,
                        "scope token has expired",
                    ));
                }
                Err(e) => {
                    return StageOutcome::Finalize(Status::new(ErrorCode::InvalidScopeToken, e.to_string()));
                }
            },
            None => None,
        };

        let operation = &ctx
            .operation_handle
            .as_ref()
            .expect("operation handle resolved above")
            .operation;
        let global_spec = self.spec_index.validator().traverser().specification();
        let spec_scopes = Self::spec_scopes_for(
            &operation.data,
            global_spec,
            self.spec_index.oauth2_security_schemes(),
        );

        let satisfied = match &scope_token_scopes {
            Some(token_scopes) => Self::scopes_satisfied(&spec_scopes, token_scopes),
            None => Self::scopes_satisfied(&spec_scopes, &claims.scopes),
        };

        if !satisfied {
            let code = if scope_token_scopes.is_some() {
                ErrorCode::ScopeTokenScopeMismatch
            } else {
                ErrorCode::AuthTokenScopeMismatch
            };
            return StageOutcome::Finalize(Status::new(
                code,
                format!("required scopes {:?} not satisfied", spec_scopes),
            ));
        }

        ctx.scopes = Some(scope_token_scopes.unwrap_or(claims.scopes));
        StageOutcome::Forward
    }
}
