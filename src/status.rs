//! Stable wire error taxonomy: every failure path in the enforcement pipeline ends up as one
//! of these codes, rendered as `{statusCode, code, message, description}`.

use crate::error::{PayloadSection, Section, ValidationErrorType};
use serde::Serialize;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidAuthToken,
    AuthTokenExpired,
    MissingAuthToken,
    InvalidScopeToken,
    ScopeTokenExpired,
    AuthTokenScopeMismatch,
    ScopeTokenScopeMismatch,
    InvalidRequestPath,
    MethodNotAllowed,
    QueryParameterMissing,
    RequestParameterMissing,
    RequestParameterInvalidFormat,
    RequestParameterBelowMin,
    RequestParameterAboveMax,
    RequestBodyUnexpected,
    RequestBodyMissing,
    HeaderParameterMissing,
    ResponseContentUnexpected,
    InternalError,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::InvalidAuthToken => "ERR10000",
            ErrorCode::AuthTokenExpired => "ERR10001",
            ErrorCode::MissingAuthToken => "ERR10002",
            ErrorCode::InvalidScopeToken => "ERR10003",
            ErrorCode::ScopeTokenExpired => "ERR10004",
            ErrorCode::AuthTokenScopeMismatch => "ERR10005",
            ErrorCode::ScopeTokenScopeMismatch => "ERR10006",
            ErrorCode::InvalidRequestPath => "ERR10007",
            ErrorCode::MethodNotAllowed => "ERR10008",
            ErrorCode::QueryParameterMissing => "ERR11000",
            ErrorCode::RequestParameterMissing => "ERR11001",
            ErrorCode::RequestParameterInvalidFormat => "ERR11010",
            ErrorCode::RequestParameterBelowMin => "ERR11011",
            ErrorCode::RequestParameterAboveMax => "ERR11012",
            ErrorCode::RequestBodyUnexpected => "ERR11013",
            ErrorCode::RequestBodyMissing => "ERR11014",
            ErrorCode::HeaderParameterMissing => "ERR11017",
            ErrorCode::ResponseContentUnexpected => "ERR11018",
            ErrorCode::InternalError => "ERR50000",
        }
    }

    pub fn meaning(&self) -> &'static str {
        match self {
            ErrorCode::InvalidAuthToken => "invalid auth token",
            ErrorCode::AuthTokenExpired => "auth token expired",
            ErrorCode::MissingAuthToken => "missing auth token",
            ErrorCode::InvalidScopeToken => "invalid scope token",
            ErrorCode::ScopeTokenExpired => "scope token expired",
            ErrorCode::AuthTokenScopeMismatch => "auth token scope mismatch",
            ErrorCode::ScopeTokenScopeMismatch => "scope token scope mismatch",
            ErrorCode::InvalidRequestPath => "invalid request path",
            ErrorCode::MethodNotAllowed => "method not allowed",
            ErrorCode::QueryParameterMissing => "query parameter missing",
            ErrorCode::RequestParameterMissing => "request parameter missing",
            ErrorCode::RequestParameterInvalidFormat => "request parameter invalid format",
            ErrorCode::RequestParameterBelowMin => "request parameter below min",
            ErrorCode::RequestParameterAboveMax => "request parameter above max",
            ErrorCode::RequestBodyUnexpected => "request body unexpected",
            ErrorCode::RequestBodyMissing => "request body missing",
            ErrorCode::HeaderParameterMissing => "header parameter missing",
            ErrorCode::ResponseContentUnexpected => "response content unexpected",
            ErrorCode::InternalError => "internal error",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            ErrorCode::InvalidAuthToken
            | ErrorCode::AuthTokenExpired
            | ErrorCode::MissingAuthToken
            | ErrorCode::InvalidScopeToken
            | ErrorCode::ScopeTokenExpired
            | ErrorCode::AuthTokenScopeMismatch
            | ErrorCode::ScopeTokenScopeMismatch => 401,
            ErrorCode::InvalidRequestPath => 404,
            ErrorCode::MethodNotAllowed => 405,
            ErrorCode::InternalError => 500,
            _ => 400,
        }
    }
}

/// Collapses a validator failure into the stable wire taxonomy. `do_validate` inspects the
/// underlying `jsonschema` error's `kind` to split out "below min"/"above max" from the rest of
/// schema validation; every other schema mismatch (wrong type, pattern, enum, etc.) still
/// collapses to [`ErrorCode::RequestParameterInvalidFormat`].
impl From<&ValidationErrorType> for ErrorCode {
    fn from(error: &ValidationErrorType) -> Self {
        match error {
            ValidationErrorType::AssertionFailed(_) => ErrorCode::RequestParameterMissing,
            ValidationErrorType::FieldExpected(_, section) => match section {
                Section::Payload(PayloadSection::Query) => ErrorCode::QueryParameterMissing,
                Section::Payload(PayloadSection::Header) => ErrorCode::HeaderParameterMissing,
                _ => ErrorCode::RequestParameterMissing,
            },
            // A spec-side section missing means the payload carried something the operation
            // never declared (e.g. a body on an operation with no requestBody); a payload-side
            // section missing means the payload itself lacks something the operation requires.
            ValidationErrorType::SectionExpected(Section::Specification(_)) => {
                ErrorCode::RequestBodyUnexpected
            }
            ValidationErrorType::SectionExpected(Section::Payload(PayloadSection::Body)) => {
                ErrorCode::RequestBodyMissing
            }
            ValidationErrorType::SectionExpected(Section::Payload(PayloadSection::Response)) => {
                ErrorCode::ResponseContentUnexpected
            }
            ValidationErrorType::SectionExpected(_) => ErrorCode::RequestParameterMissing,
            ValidationErrorType::BelowMinimum(_, _) => ErrorCode::RequestParameterBelowMin,
            ValidationErrorType::AboveMaximum(_, _) => ErrorCode::RequestParameterAboveMax,
            ValidationErrorType::SchemaValidationFailed(_, _)
            | ValidationErrorType::UnexpectedType { .. }
            | ValidationErrorType::ValueExpected(_, _)
            | ValidationErrorType::UnableToParse(_, _) => ErrorCode::RequestParameterInvalidFormat,
            ValidationErrorType::TraversalFailed(_, _)
            | ValidationErrorType::LoadingResourceFailed(_, _)
            | ValidationErrorType::VersionFailed(_, _)
            | ValidationErrorType::CircularReference(_, _)
            | ValidationErrorType::InvalidRef(_, _) => ErrorCode::InternalError,
        }
    }
}

impl Status {
    /// Builds a [`Status`] from a validator failure, mapping it to the matching wire code via
    /// [`ErrorCode::from`].
    pub fn from_validation_error(error: &ValidationErrorType) -> Self {
        Self::new(ErrorCode::from(error), error.to_string())
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The JSON status object written on every failure path: `{statusCode, code, message, description}`.
#[derive(Debug, Clone, Serialize)]
pub struct Status {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub code: &'static str,
    pub message: &'static str,
    pub description: String,
}

impl Status {
    pub fn new(code: ErrorCode, description: impl Into<String>) -> Self {
        Self {
            status_code: code.http_status(),
            code: code.code(),
            message: code.meaning(),
            description: description.into(),
        }
    }

    pub fn internal(description: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, description)
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.status_code, self.code, self.description)
    }
}

impl std::error::Error for Status {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn invalid_auth_token_maps_to_401() {
        let status = Status::new(ErrorCode::InvalidAuthToken, "missing kid");
        assert_eq!(status.status_code, 401);
        assert_eq!(status.code, "ERR10000");
    }

    #[test]
    fn invalid_request_path_maps_to_404() {
        let status = Status::new(ErrorCode::InvalidRequestPath, "no template matched");
        assert_eq!(status.status_code, 404);
        assert_eq!(status.code, "ERR10007");
    }

    #[test]
    fn method_not_allowed_maps_to_405() {
        let status = Status::new(ErrorCode::MethodNotAllowed, "patch not declared");
        assert_eq!(status.status_code, 405);
        assert_eq!(status.code, "ERR10008");
    }

    #[test]
    fn request_parameter_below_min_maps_to_400() {
        let status = Status::new(ErrorCode::RequestParameterBelowMin, "limit=0");
        assert_eq!(status.status_code, 400);
        assert_eq!(status.code, "ERR11011");
    }

    #[test]
    fn missing_query_param_maps_to_query_parameter_missing() {
        let error = ValidationErrorType::FieldExpected(
            "limit".to_string(),
            Section::Payload(PayloadSection::Query),
        );
        assert_eq!(ErrorCode::from(&error), ErrorCode::QueryParameterMissing);
    }

    #[test]
    fn unexpected_requestbody_section_maps_to_body_unexpected() {
        let error = ValidationErrorType::SectionExpected(Section::Specification(
            crate::error::SpecificationSection::Paths(crate::error::OperationSection::RequestBody),
        ));
        assert_eq!(ErrorCode::from(&error), ErrorCode::RequestBodyUnexpected);
    }

    #[test]
    fn missing_payload_body_section_maps_to_body_missing() {
        let error = ValidationErrorType::SectionExpected(Section::Payload(PayloadSection::Body));
        assert_eq!(ErrorCode::from(&error), ErrorCode::RequestBodyMissing);
    }

    #[test]
    fn missing_payload_response_section_maps_to_response_content_unexpected() {
        let error = ValidationErrorType::SectionExpected(Section::Payload(PayloadSection::Response));
        assert_eq!(ErrorCode::from(&error), ErrorCode::ResponseContentUnexpected);
    }

    #[test]
    fn schema_mismatch_collapses_to_invalid_format() {
        let error = ValidationErrorType::SchemaValidationFailed(
            "pattern".to_string(),
            Section::Payload(PayloadSection::Query),
        );
        assert_eq!(
            ErrorCode::from(&error),
            ErrorCode::RequestParameterInvalidFormat
        );
    }

    #[test]
    fn below_minimum_maps_to_request_parameter_below_min() {
        let error = ValidationErrorType::BelowMinimum(
            "0 is less than the minimum of 1".to_string(),
            Section::Payload(PayloadSection::Query),
        );
        assert_eq!(ErrorCode::from(&error), ErrorCode::RequestParameterBelowMin);
        let status = Status::from_validation_error(&error);
        assert_eq!(status.code, "ERR11011");
    }

    #[test]
    fn above_maximum_maps_to_request_parameter_above_max() {
        let error = ValidationErrorType::AboveMaximum(
            "4 is greater than the maximum of 3".to_string(),
            Section::Payload(PayloadSection::Query),
        );
        assert_eq!(ErrorCode::from(&error), ErrorCode::RequestParameterAboveMax);
        let status = Status::from_validation_error(&error);
        assert_eq!(status.code, "ERR11012");
    }

    #[test]
    fn from_validation_error_carries_the_message_through() {
        let error = ValidationErrorType::assertion_failed(&"missing required header");
        let status = Status::from_validation_error(&error);
        assert_eq!(status.code, "ERR11001");
    }
}
