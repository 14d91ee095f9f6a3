use lambda_http::{service_fn, Body, Error, IntoResponse, Request, RequestExt};
use oas_gatekeeper::validator::{OpenApiPayloadValidator, RequestValidationSettings};
use std::collections::HashMap;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let openapi_file =
        std::fs::read_to_string("examples/aws-lambda-http-validation/openapi-v3.1.0.json").unwrap();
    let openapi_value: serde_json::Value = serde_json::from_str(&openapi_file).unwrap();
    let validator = Arc::new(OpenApiPayloadValidator::new(openapi_value).unwrap());
    lambda_http::run(service_fn(|req| {
        validation_function(validator.clone(), req)
    }))
    .await?;
    Ok(())
}

/// `validate_request` needs a concrete `HttpLike<T>` impl and API Gateway's `Body` is a Text /
/// Binary / Empty enum, not a fixed `T` — so the handler parses the body to `Value` itself and
/// rebuilds an `http::Request<Value>` around it, reusing `converter.rs`'s blanket
/// `HttpLike<T> for http::Request<T>` impl rather than writing a second one for `lambda_http::Body`.
async fn validation_function(
    validator: Arc<OpenApiPayloadValidator>,
    request: Request,
) -> Result<impl IntoResponse, std::convert::Infallible> {
    let _context = request.lambda_context_ref();
    let query_params = request.query_string_parameters_ref().cloned();

    let (parts, body) = request.into_parts();
    let json_body = match &body {
        Body::Text(text) => serde_json::from_str(text).unwrap_or(serde_json::Value::Null),
        Body::Binary(bytes) => {
            serde_json::from_slice(bytes).unwrap_or(serde_json::Value::Null)
        }
        Body::Empty => serde_json::Value::Null,
    };
    let request_like = http::Request::from_parts(parts, json_body);

    match validator.validate_request(
        &request_like,
        &HashMap::new(),
        None,
        &RequestValidationSettings::default(),
    ) {
        Ok(_) => Ok(format!(
            "hello {}",
            query_params
                .as_ref()
                .and_then(|params| params.first("name"))
                .unwrap_or("stranger")
        )),
        Err(e) => Ok(format!("{:?}", e)),
    }
}
