use crate::audit::AuditKey;
use crate::middleware::{ExchangeCtx, Stage, StageOutcome};
use crate::router::PathRouter;
use crate::spec_index::{RoutingError, SpecIndex};
use crate::status::{ErrorCode, Status};
use std::sync::Arc;

/// Resolves the inbound request's path and method to an [`crate::spec_index::OperationHandle`],
/// captures path parameters, and records the endpoint in the audit context. Runs first, always:
/// every downstream stage (JWT, request validation) needs the resolved operation.
pub struct SpecMatchStage {
    spec_index: Arc<SpecIndex>,
}

impl SpecMatchStage {
    pub fn new(spec_index: Arc<SpecIndex>) -> Self {
        Self { spec_index }
    }
}

impl<T> Stage<T> for SpecMatchStage {
    fn handle(&self, ctx: &mut ExchangeCtx<T>) -> StageOutcome {
        let path = ctx.request.uri().path().to_string();
        let method = ctx.request.method().as_str().to_string();

        let handle = match self.spec_index.find_operation_handle(&path, &method) {
            Ok(handle) => handle,
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
        };

        ctx.path_params = PathRouter::capture_params(&handle.path_template, &handle.normalised_path);
        ctx.audit.insert(AuditKey::Endpoint, handle.endpoint());
        ctx.audit
            .insert(AuditKey::Operation, handle.path_template.text().to_string());
        ctx.operation_handle = Some(handle);

        StageOutcome::Forward
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::{json, Value};

    fn spec_index() -> Arc<SpecIndex> {
        let spec = json!({
            "openapi": "3.0.0",
            "paths": {
                "/pets/{petId}": {
                    "get": { "responses": { "200": { "description": "OK" } } }
                }
            }
        });
        Arc::new(SpecIndex::build(spec).unwrap())
    }

    fn request(path: &str, method: http::Method) -> http::Request<Value> {
        http::Request::builder()
            .method(method)
            .uri(path)
            .body(Value::Null)
            .unwrap()
    }

    #[test]
    fn matched_path_captures_params_and_audit_endpoint() {
        let stage = SpecMatchStage::new(spec_index());
        let mut ctx = ExchangeCtx::new(request("/pets/42", http::Method::GET));
        assert!(matches!(stage.handle(&mut ctx), StageOutcome::Forward));
        assert_eq!(ctx.path_params.get("petId"), Some(&"42".to_string()));
        assert_eq!(ctx.audit.get_str(AuditKey::Endpoint), Some("/pets/42@get"));
        assert!(ctx.operation_handle.is_some());
    }

    #[test]
    fn unknown_path_finalizes_with_invalid_request_path() {
        let stage = SpecMatchStage::new(spec_index());
        let mut ctx = ExchangeCtx::new(request("/unknown", http::Method::GET));
        match stage.handle(&mut ctx) {
            StageOutcome::Finalize(status) => assert_eq!(status.code, "ERR10007"),
            StageOutcome::Forward => panic!("expected finalize"),
        }
    }

    #[test]
    fn undeclared_method_finalizes_with_method_not_allowed() {
        let stage = SpecMatchStage::new(spec_index());
        let mut ctx = ExchangeCtx::new(request("/pets/42", http::Method::POST));
        match stage.handle(&mut ctx) {
            StageOutcome::Finalize(status) => assert_eq!(status.code, "ERR10008"),
            StageOutcome::Forward => panic!("expected finalize"),
        }
    }
}
