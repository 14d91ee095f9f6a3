use crate::error::{PayloadSection, Section, ValidationErrorType};
use crate::traverser::OpenApiTraverser;
use crate::types::primitive::OpenApiPrimitives;
use crate::types::{Operation, ParameterLocation};
use crate::validator::Validator;
use crate::{IN_FIELD, NAME_FIELD, PARAMETERS_FIELD, REQUIRED_FIELD, SCHEMA_FIELD};
use jsonschema::ValidationOptions;
use serde_json::json;
use std::collections::HashMap;

pub(crate) struct RequestParameterValidator<'validator> {
    request_instance: &'validator HashMap<String, Vec<String>>,
    parameter_location: ParameterLocation,
    section: Section,
}

impl<'validator> RequestParameterValidator<'validator> {
    pub(crate) fn new<'node>(
        request_instance: &'node HashMap<String, Vec<String>>,
        parameter_location: ParameterLocation,
    ) -> Self
    where
        'node: 'validator,
    {
        let section = Section::Payload(match parameter_location {
            ParameterLocation::Header => PayloadSection::Header,
            ParameterLocation::Query => PayloadSection::Query,
            ParameterLocation::Cookie => PayloadSection::Other,
            ParameterLocation::Path => PayloadSection::Path,
        });
        Self {
            request_instance,
            parameter_location,
            section,
        }
    }
}

impl Validator for RequestParameterValidator<'_> {
    /// Validates request parameters against an OpenAPI operation definition.
    fn validate(
        &self,
        traverser: &OpenApiTraverser,
        op: &Operation,
        validation_options: &ValidationOptions,
    ) -> Result<(), ValidationErrorType> {
        let op_def = &op.data;
        let operation_id =
            OpenApiTraverser::get_as_str(op_def, "operationId").unwrap_or("default_operation_id");
        let param_defs = match traverser.get_optional(op_def, PARAMETERS_FIELD) {
            Ok(defs) => defs,
            Err(e) => {
                return Err(ValidationErrorType::traversal_failed(
                    e,
                    &format!(
                        "Failed to get 'parameters' from operation '{}'",
                        operation_id
                    ),
                ));
            }
        };

        match param_defs {
            Some(param_defs) => {
                let param_defs = match OpenApiTraverser::require_array(param_defs.value()) {
                    Ok(param_defs) => param_defs,
                    Err(e) => {
                        return Err(ValidationErrorType::traversal_failed(
                            e,
                            &format!(
                                "Failed to parse 'parameters' as a vector value in {}",
                                operation_id
                            ),
                        ));
                    }
                };

                for param_def in param_defs {
                    // Only look at parameters that match the current section.
                    let loc = match traverser.get_required(param_def, IN_FIELD) {
                        Ok(in_f) => in_f,
                        Err(e) => {
                            return Err(ValidationErrorType::traversal_failed(
                                e,
                                &format!(
                                    "Failed to get 'in' in parameter definition in operation '{}'",
                                    operation_id
                                ),
                            ));
                        }
                    };
                    let loc = match OpenApiTraverser::require_str(loc.value()) {
                        Ok(loc) => loc,
                        Err(e) => {
                            return Err(ValidationErrorType::traversal_failed(
                                e,
                                &format!(
                                    "Failed to parse 'in' from parameter as a string value in {}",
                                    operation_id
                                ),
                            ));
                        }
                    };

                    if loc.to_lowercase() == self.parameter_location.to_string().to_lowercase() {
                        let param_name = match traverser.get_required(param_def, NAME_FIELD) {
                            Ok(param_name) => param_name,
                            Err(e) => {
                                return Err(ValidationErrorType::traversal_failed(
                                    e,
                                    &format!(
                                        "Failed to get 'name' from parameter in operation '{}'",
                                        operation_id
                                    ),
                                ));
                            }
                        };

                        let param_name = match OpenApiTraverser::require_str(param_name.value()) {
                            Ok(param_name) => param_name,
                            Err(e) => {
                                return Err(ValidationErrorType::traversal_failed(
                                    e,
                                    &format!(
                                        "Failed to parse 'name' from parameter as a string value in {}",
                                        operation_id
                                    ),
                                ));
                            }
                        };

                        let is_param_required = match traverser
                            .get_optional(param_def, REQUIRED_FIELD)
                        {
                            Ok(is_param_required) => is_param_required,
                            Err(e) => {
                                return Err(ValidationErrorType::traversal_failed(
                                    e,
                                    &format!(
                                        "Failed to get 'required' from parameter '{}' in operation '{}'",
                                        param_name, operation_id
                                    ),
                                ));
                            }
                        };

                        let is_param_required: bool = match is_param_required {
                            None => false,
                            Some(val) => {
                                OpenApiTraverser::require_bool(val.value()).unwrap_or_else(|_| {
                                    log::trace!("Request parameter '{}' in operation '{}' does not have 'required' field defined. Using false as default.", param_name, operation_id);
                                    false
                                })
                            }
                        };

                        let param_schema = match traverser.get_required(param_def, SCHEMA_FIELD) {
                            Ok(param_schema) => param_schema,
                            Err(e) => {
                                return Err(ValidationErrorType::traversal_failed(
                                    e,
                                    &format!(
                                        "Failed to get 'schema' from parameter '{}' in operation '{}'",
                                        param_name, operation_id
                                    ),
                                ));
                            }
                        };

                        let param_schema = param_schema.value();
                        if let Some(values) = self.request_instance.get(param_name) {
                            if values.len() > 1 {
                                // Two or more values under the same name: validate the whole
                                // collection against the schema so array constraints (e.g.
                                // minItems/maxItems) apply, rather than just the last value.
                                let items_schema = param_schema.get("items");
                                let mut converted = Vec::with_capacity(values.len());
                                for value in values {
                                    let item = match items_schema {
                                        Some(items_schema) => {
                                            OpenApiPrimitives::convert_string_to_schema_type(
                                                items_schema,
                                                value,
                                            )?
                                        }
                                        None => json!(value),
                                    };
                                    converted.push(item);
                                }
                                let inst = json!(converted);
                                Self::complex_validation_by_schema(
                                    validation_options,
                                    param_schema,
                                    &inst,
                                    self.section().clone(),
                                )?
                            } else {
                                let req_param_val = &values[0];
                                let inst = json!(req_param_val);
                                if let Some(string) = inst.as_str() {
                                    let inst = OpenApiPrimitives::convert_string_to_schema_type(
                                        param_schema,
                                        string,
                                    )?;
                                    Self::complex_validation_by_schema(
                                        validation_options,
                                        param_schema,
                                        &inst,
                                        self.section().clone(),
                                    )?
                                } else {
                                    Self::complex_validation_by_schema(
                                        validation_options,
                                        param_schema,
                                        &inst,
                                        self.section().clone(),
                                    )?
                                }
                            }
                        } else if is_param_required {
                            return Err(ValidationErrorType::assertion_failed(&format!(
                                "Parameter '{}' is required but not found in request.",
                                param_name
                            )));
                        }
                    }
                }
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn section(&self) -> &Section {
        &self.section
    }
}
