//! A small synchronous stage chain: each stage inspects and optionally enriches one exchange,
//! then either forwards it to the next stage or finalizes the exchange with a wire [`Status`].
//!
//! Collapsed from an async handler-executor shape down to a synchronous one; nothing here does
//! I/O except the JWT stage's (blocking) JWKS fetch, so there's no reason to force an executor
//! on every caller.

mod jwt_verify;
mod request_validate;
mod response_validate;
mod spec_match;

pub use jwt_verify::JwtVerifyStage;
pub use request_validate::RequestValidateStage;
pub use response_validate::{ResponseContext, ResponseValidateStage};
pub use spec_match::SpecMatchStage;

use crate::audit::AuditContext;
use crate::config::EngineConfig;
use crate::jwt::JwtVerifier;
use crate::spec_index::{OperationHandle, SpecIndex};
use crate::status::Status;
use std::collections::HashMap;
use std::sync::Arc;

/// Per-exchange state threaded through the chain: the inbound request, whatever the spec-match
/// stage captured and resolved, and a slot for the downstream response once one exists.
pub struct ExchangeCtx<T> {
    pub request: http::Request<T>,
    pub path_params: HashMap<String, String>,
    pub operation_handle: Option<OperationHandle>,
    pub scopes: Option<Vec<String>>,
    pub audit: AuditContext,
    pub response: Option<ResponseContext<T>>,
}

impl<T> ExchangeCtx<T> {
    pub fn new(request: http::Request<T>) -> Self {
        Self {
            request,
            path_params: HashMap::new(),
            operation_handle: None,
            scopes: None,
            audit: AuditContext::new(),
            response: None,
        }
    }
}

/// What a stage decided to do with the exchange it was handed.
pub enum StageOutcome {
    /// Continue to the next stage.
    Forward,
    /// Stop the chain here; `Status` is the response to send.
    Finalize(Status),
}

/// One step of the enforcement pipeline.
pub trait Stage<T>: Send + Sync {
    fn handle(&self, ctx: &mut ExchangeCtx<T>) -> StageOutcome;
}

/// Runs `ctx` through every stage in order, stopping at the first one that finalizes.
/// Returns `Ok(())` if every stage forwarded, or the finalizing `Status` otherwise.
pub fn run_chain<T>(stages: &[Box<dyn Stage<T>>], ctx: &mut ExchangeCtx<T>) -> Result<(), Status> {
    for stage in stages {
        match stage.handle(ctx) {
            StageOutcome::Forward => continue,
            StageOutcome::Finalize(status) => return Err(status),
        }
    }
    Ok(())
}

/// Assembles the standard request-side stage chain (spec match, optional JWT+scope
/// verification, request validation) from a loaded spec and runtime configuration. Response
/// validation is run separately, after the downstream handler produces a response — see
/// [`ResponseValidateStage`].
pub fn build_request_chain<T>(
    spec_index: Arc<SpecIndex>,
    config: &EngineConfig,
    verifier: Option<Arc<JwtVerifier>>,
) -> Vec<Box<dyn Stage<T>>>
where
    T: serde::Serialize + Send + Sync + 'static,
{
    let mut stages: Vec<Box<dyn Stage<T>>> = vec![Box::new(SpecMatchStage::new(spec_index.clone()))];

    if config.security.enable_verify_jwt {
        if let Some(verifier) = verifier {
            stages.push(Box::new(JwtVerifyStage::new(
                verifier,
                spec_index.clone(),
                config.security.enable_verify_scope,
            )));
        }
    }

    if config.validator.enabled {
        stages.push(Box::new(RequestValidateStage::new(
            spec_index,
            config.validator.request_validation_settings(),
        )));
    }

    stages
}

/// Builds the [`ResponseValidateStage`] the caller should invoke once the downstream handler
/// has produced a response, honoring `config.validator.validate_response`. Returns `None` when
/// response validation is disabled, so callers can skip attaching a response to `ExchangeCtx`
/// at all rather than pay for a no-op check.
pub fn build_response_stage(
    spec_index: Arc<SpecIndex>,
    config: &EngineConfig,
) -> Option<ResponseValidateStage> {
    if !config.validator.validate_response {
        return None;
    }
    Some(ResponseValidateStage::new(spec_index))
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn spec_index() -> Arc<SpecIndex> {
        let spec = json!({
            "openapi": "3.0.0",
            "paths": {
                "/pets": {
                    "get": { "responses": { "200": { "description": "OK" } } }
                }
            }
        });
        Arc::new(SpecIndex::build(spec).unwrap())
    }

    #[test]
    fn request_chain_skips_jwt_stage_when_verification_disabled() {
        let mut config = EngineConfig::default();
        config.validator.enabled = true;
        let chain: Vec<Box<dyn Stage<serde_json::Value>>> =
            build_request_chain(spec_index(), &config, None);
        // spec-match + request-validate, no JWT stage since security.enable_verify_jwt is false.
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn request_chain_is_spec_match_only_by_default() {
        let config = EngineConfig::default();
        let chain: Vec<Box<dyn Stage<serde_json::Value>>> =
            build_request_chain(spec_index(), &config, None);
        // validator.enabled and security.enable_verify_jwt both default to false.
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn response_stage_absent_unless_configured() {
        let config = EngineConfig::default();
        assert!(build_response_stage(spec_index(), &config).is_none());
    }

    #[test]
    fn response_stage_present_when_validate_response_enabled() {
        let mut config = EngineConfig::default();
        config.validator.validate_response = true;
        assert!(build_response_stage(spec_index(), &config).is_some());
    }
}
