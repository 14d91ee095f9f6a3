use crate::error::{
    OperationSection, PayloadSection, Section, SpecificationSection, ValidationErrorType,
};
use crate::traverser::OpenApiTraverser;
use crate::types::Operation;
use crate::validator::Validator;
use crate::{CONTENT_FIELD, DEFAULT_RESPONSE_FIELD, REQUIRED_FIELD, RESPONSES_FIELD, SCHEMA_FIELD};
use jsonschema::ValidationOptions;
use serde_json::Value;

/// Validates an HTTP response body against the schema declared for its status code,
/// falling back to the operation's `default` response when no exact match exists.
pub(crate) struct ResponseBodyValidator<'a> {
    response_instance: Option<&'a Value>,
    status_code: String,
    content_type: Option<String>,
    section: Section,
}

impl<'a> ResponseBodyValidator<'a> {
    pub(crate) fn new<'b>(
        response_instance: Option<&'b Value>,
        status_code: u16,
        content_type: Option<String>,
    ) -> Self
    where
        'b: 'a,
    {
        Self {
            response_instance,
            status_code: status_code.to_string(),
            content_type,
            section: Section::Payload(PayloadSection::Response),
        }
    }

    /// Looks up the `responses.<status_code>` entry, falling back to `responses.default`.
    fn find_response_def<'t>(
        &self,
        traverser: &'t OpenApiTraverser,
        op_def: &'t Value,
    ) -> Result<Option<crate::traverser::SearchResult<'t>>, ValidationErrorType> {
        let responses_def = match traverser.get_optional(op_def, RESPONSES_FIELD)? {
            None => {
                return Err(ValidationErrorType::SectionExpected(Section::Specification(
                    SpecificationSection::Paths(OperationSection::Responses),
                )));
            }
            Some(val) => val,
        };

        match traverser.get_optional(responses_def.value(), &self.status_code)? {
            Some(found) => Ok(Some(found)),
            None => traverser.get_optional(responses_def.value(), DEFAULT_RESPONSE_FIELD),
        }
    }

    /// Checks that fields the response schema marks `required` are present in the body.
    fn check_required_fields(
        traverser: &OpenApiTraverser,
        response_schema: &Value,
        response_body: Option<&Value>,
    ) -> Result<(), ValidationErrorType> {
        if let Some(required_fields) = traverser.get_optional(response_schema, REQUIRED_FIELD)? {
            let required_fields = OpenApiTraverser::require_array(required_fields.value())?;
            if let Some(body) = response_body {
                for required in required_fields {
                    let required_field = OpenApiTraverser::require_str(required)?;
                    if body.get(required_field).is_none() {
                        return Err(ValidationErrorType::FieldExpected(
                            required_field.to_string(),
                            Section::Payload(PayloadSection::Response),
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

impl<'a> Validator for ResponseBodyValidator<'a> {
    /// Validates the response body of an operation against the schema declared for the
    /// response's status code (or the `default` response, if no exact match exists).
    fn validate(
        &self,
        traverser: &OpenApiTraverser,
        op: &Operation,
        validation_opts: &ValidationOptions,
    ) -> Result<(), ValidationErrorType> {
        let (op_def, mut op_path) = (&op.data, op.path.clone());

        let response_def = match self.find_response_def(traverser, op_def)? {
            None => {
                // Neither the status-code response nor a `default` fallback is declared:
                // the operation makes no claim about this response at all.
                return Err(ValidationErrorType::SectionExpected(Section::Payload(
                    PayloadSection::Response,
                )));
            }
            Some(val) => val,
        };

        let Some(ctype) = &self.content_type else {
            // Without a Content-Type we cannot select a media-type schema; skip validation
            // rather than reject a response that may legitimately carry no body.
            return Ok(());
        };

        let content_def = match traverser.get_optional(response_def.value(), CONTENT_FIELD)? {
            None => return Ok(()),
            Some(val) => val,
        };

        let media_def = match traverser.get_optional(content_def.value(), ctype)? {
            None => return Ok(()),
            Some(val) => val,
        };

        let media_schema = traverser.get_required(media_def.value(), SCHEMA_FIELD)?;
        Self::check_required_fields(traverser, media_schema.value(), self.response_instance)?;

        // A schema was resolved for this response but no body was presented to validate
        // against it: schema and body must both be present or both be absent.
        let Some(body_instance) = self.response_instance else {
            return Err(ValidationErrorType::SectionExpected(Section::Payload(
                PayloadSection::Response,
            )));
        };

        op_path
            .add(RESPONSES_FIELD)
            .add(&self.status_code)
            .add(CONTENT_FIELD)
            .add(ctype)
            .add(SCHEMA_FIELD);

        Self::complex_validation_by_path(
            validation_opts,
            &op_path,
            body_instance,
            self.section.clone(),
        )
    }

    fn section(&self) -> &Section {
        &self.section
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traverser::OpenApiTraverser;
    use crate::types::json_path::JsonPath;
    use jsonschema::Validator as JsonValidator;
    use serde_json::json;

    fn spec() -> Value {
        json!({
            "openapi": "3.1.0",
            "$id": "@@root",
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
                            },
                            "default": {
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "required": ["error"],
                                            "properties": { "error": { "type": "string" } }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        })
    }

    fn options(spec: &Value) -> ValidationOptions {
        JsonValidator::options().with_resource(
            "@@inner",
            jsonschema::Resource::from_contents(spec.clone()).unwrap(),
        )
    }

    fn operation(spec: &Value) -> Operation {
        let op_def = spec["paths"]["/pets"]["get"].clone();
        let mut path = JsonPath::new();
        path.add("paths").add("/pets").add("get");
        Operation {
            data: op_def,
            path,
        }
    }

    #[test]
    fn matches_status_code_schema() {
        let spec = spec();
        let traverser = OpenApiTraverser::new(spec.clone()).unwrap();
        let op = operation(&spec);
        let body = json!({ "id": 1 });
        let validator =
            ResponseBodyValidator::new(Some(&body), 200, Some("application/json".to_string()));
        assert!(validator.validate(&traverser, &op, &options(&spec)).is_ok());
    }

    #[test]
    fn falls_back_to_default_response() {
        let spec = spec();
        let traverser = OpenApiTraverser::new(spec.clone()).unwrap();
        let op = operation(&spec);
        let body = json!({ "error": "bad request" });
        let validator =
            ResponseBodyValidator::new(Some(&body), 500, Some("application/json".to_string()));
        assert!(validator.validate(&traverser, &op, &options(&spec)).is_ok());
    }

    #[test]
    fn rejects_body_not_matching_schema() {
        let spec = spec();
        let traverser = OpenApiTraverser::new(spec.clone()).unwrap();
        let op = operation(&spec);
        let body = json!({ "id": "not-an-integer" });
        let validator =
            ResponseBodyValidator::new(Some(&body), 200, Some("application/json".to_string()));
        assert!(validator.validate(&traverser, &op, &options(&spec)).is_err());
    }

    #[test]
    fn status_code_response_with_no_schema_passes_regardless_of_body() {
        let spec_no_schema = json!({
            "openapi": "3.1.0",
            "paths": { "/pets": { "get": { "responses": { "200": { "description": "ok" } } } } }
        });
        let op = {
            let op_def = spec_no_schema["paths"]["/pets"]["get"].clone();
            let mut path = JsonPath::new();
            path.add("paths").add("/pets").add("get");
            Operation {
                data: op_def,
                path,
            }
        };
        let traverser = OpenApiTraverser::new(spec_no_schema.clone()).unwrap();
        let body = json!({ "anything": true });
        let validator =
            ResponseBodyValidator::new(Some(&body), 200, Some("application/json".to_string()));
        assert!(validator
            .validate(&traverser, &op, &options(&spec_no_schema))
            .is_ok());
    }

    #[test]
    fn neither_status_nor_default_response_is_unexpected() {
        let spec_no_default = json!({
            "openapi": "3.1.0",
            "paths": { "/pets": { "get": { "responses": { "200": { "description": "ok" } } } } }
        });
        let op = {
            let op_def = spec_no_default["paths"]["/pets"]["get"].clone();
            let mut path = JsonPath::new();
            path.add("paths").add("/pets").add("get");
            Operation {
                data: op_def,
                path,
            }
        };
        let traverser = OpenApiTraverser::new(spec_no_default.clone()).unwrap();
        let body = json!({ "anything": true });
        let validator =
            ResponseBodyValidator::new(Some(&body), 404, Some("application/json".to_string()));
        assert!(validator
            .validate(&traverser, &op, &options(&spec_no_default))
            .is_err());
    }

    #[test]
    fn schema_present_but_body_absent_is_unexpected() {
        let spec = spec();
        let traverser = OpenApiTraverser::new(spec.clone()).unwrap();
        let op = operation(&spec);
        let validator = ResponseBodyValidator::new(None, 200, Some("application/json".to_string()));
        assert!(validator.validate(&traverser, &op, &options(&spec)).is_err());
    }
}
