use crate::middleware::ExchangeCtx;
use crate::spec_index::SpecIndex;
use crate::status::Status;
use http::HeaderMap;
use std::sync::Arc;

/// The downstream response captured after the business handler runs. Carries the status code
/// and headers separately from `ExchangeCtx.request` since a response has no method or path —
/// [`ResponseValidateStage`] rebuilds a minimal [`http::Request`] around its body to reuse
/// [`crate::converter::HttpLike`] rather than adding a second trait impl just for this.
pub struct ResponseContext<T> {
    pub status_code: u16,
    pub headers: HeaderMap,
    pub body: T,
}

impl<T> ResponseContext<T> {
    pub fn new(status_code: u16, headers: HeaderMap, body: T) -> Self {
        Self {
            status_code,
            headers,
            body,
        }
    }
}

/// Validates the downstream response body against the schema declared for its status code
/// (or the operation's `default` response). Run separately from the request-side chain, once
/// the business handler has produced a response and it's been attached to `ctx.response`.
pub struct ResponseValidateStage {
    spec_index: Arc<SpecIndex>,
}

impl ResponseValidateStage {
    pub fn new(spec_index: Arc<SpecIndex>) -> Self {
        Self { spec_index }
    }

    /// No-op if `ctx.response` was never attached. Errors if a response was attached but no
    /// operation was ever resolved for the exchange — that's a caller bug, not a validation
    /// failure, so it's reported as an internal error rather than silently passing.
    pub fn validate<T>(&self, ctx: &ExchangeCtx<T>) -> Result<(), Status>
    where
        T: serde::Serialize + Clone,
    {
        let Some(response) = &ctx.response else {
            return Ok(());
        };

        let Some(handle) = &ctx.operation_handle else {
            return Err(Status::internal(
                "response validation requires a resolved operation handle",
            ));
        };

        let mut request_like = http::Request::new(response.body.clone());
        *request_like.headers_mut() = response.headers.clone();

        self.spec_index
            .validator()
            .validate_response(&handle.operation, &request_like, response.status_code)
            .map_err(|e| Status::from_validation_error(&e))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::spec_index::SpecIndex;
    use serde_json::{json, Value};

    fn spec_index() -> Arc<SpecIndex> {
        let spec = json!({
            "openapi": "3.0.0",
            "paths": {
                "/pets": {
                    "get": {
                        "responses": {
                            "200": {
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "required": ["id"],
                                            "properties": { "id": { "type": "integer" } }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        });
        Arc::new(SpecIndex::build(spec).unwrap())
    }

    fn ctx_with_operation(body: Value, status_code: u16, content_type: Option<&str>) -> ExchangeCtx<Value> {
        let index = spec_index();
        let handle = index.find_operation_handle("/pets", "get").unwrap();
        let request = http::Request::builder()
            .method(http::Method::GET)
            .uri("/pets")
            .body(Value::Null)
            .unwrap();
        let mut ctx = ExchangeCtx::new(request);
        ctx.operation_handle = Some(handle);

        let mut headers = HeaderMap::new();
        if let Some(ctype) = content_type {
            headers.insert(http::header::CONTENT_TYPE, ctype.parse().unwrap());
        }
        ctx.response = Some(ResponseContext::new(status_code, headers, body));
        ctx
    }

    #[test]
    fn no_response_attached_is_a_no_op() {
        let stage = ResponseValidateStage::new(spec_index());
        let request = http::Request::builder()
            .method(http::Method::GET)
            .uri("/pets")
            .body(Value::Null)
            .unwrap();
        let ctx = ExchangeCtx::new(request);
        assert!(stage.validate(&ctx).is_ok());
    }

    #[test]
    fn matching_response_body_passes() {
        let stage = ResponseValidateStage::new(spec_index());
        let ctx = ctx_with_operation(json!({ "id": 1 }), 200, Some("application/json"));
        assert!(stage.validate(&ctx).is_ok());
    }

    #[test]
    fn response_body_failing_schema_is_rejected() {
        let stage = ResponseValidateStage::new(spec_index());
        let ctx = ctx_with_operation(json!({ "id": "not-an-integer" }), 200, Some("application/json"));
        let result = stage.validate(&ctx);
        match result {
            Err(status) => assert_eq!(status.code, "ERR11010"),
            Ok(()) => panic!("expected schema validation failure"),
        }
    }

    #[test]
    fn undeclared_status_code_is_response_content_unexpected() {
        let stage = ResponseValidateStage::new(spec_index());
        let ctx = ctx_with_operation(json!({ "id": 1 }), 404, Some("application/json"));
        let result = stage.validate(&ctx);
        match result {
            Err(status) => assert_eq!(status.code, "ERR11018"),
            Ok(()) => panic!("expected response content unexpected"),
        }
    }
}
