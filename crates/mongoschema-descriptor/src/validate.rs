use jsonschema::JSONSchema;
use mongoschema_core::DeclarationGraph;
use serde_json::Value;

use crate::errors::{DescriptorError, Result, ValidationIssue, ValidationReport};
use crate::mapper::build_graph;
use crate::model::Descriptor;
use crate::schema::descriptor_json_schema;

/// Descriptor that passed validation, with its mapped declaration graph.
#[derive(Debug, Clone)]
pub struct ValidatedDescriptor {
    pub descriptor: Descriptor,
    pub graph: DeclarationGraph,
    pub warnings: Vec<ValidationIssue>,
}

/// Validate a descriptor document against the descriptor JSON Schema.
pub fn validate_descriptor_json(descriptor_json: &Value) -> Result<ValidationReport> {
    let schema = serde_json::to_value(descriptor_json_schema())?;
    let compiled =
        JSONSchema::compile(&schema).map_err(|err| DescriptorError::Schema(err.to_string()))?;

    let mut report = ValidationReport::default();

    if let Err(errors) = compiled.validate(descriptor_json) {
        for error in errors {
            let path = normalized_json_pointer(&error.instance_path.to_string());
            report.push_error(ValidationIssue::error(
                "schema_violation",
                path,
                error.to_string(),
                None,
            ));
        }
    }

    Ok(report)
}

/// Validate the descriptor end-to-end, returning structured issues on failure.
pub fn validate_descriptor(
    descriptor_json: &Value,
) -> std::result::Result<ValidatedDescriptor, ValidationReport> {
    let structural = match validate_descriptor_json(descriptor_json) {
        Ok(report) => report,
        Err(err) => {
            let mut report = ValidationReport::default();
            report.push_error(ValidationIssue::error(
                "schema_validation_error",
                "/",
                err.to_string(),
                None,
            ));
            return Err(report);
        }
    };

    if !structural.is_ok() {
        return Err(structural);
    }

    let descriptor: Descriptor = match serde_json::from_value(descriptor_json.clone()) {
        Ok(descriptor) => descriptor,
        Err(err) => {
            let mut report = ValidationReport::default();
            report.push_error(ValidationIssue::error(
                "invalid_descriptor_json",
                "/",
                err.to_string(),
                None,
            ));
            return Err(report);
        }
    };

    let mut report = ValidationReport::default();
    let graph = build_graph(&descriptor, &mut report);
    if !report.is_ok() {
        return Err(report);
    }

    Ok(ValidatedDescriptor {
        descriptor,
        graph,
        warnings: report.warnings,
    })
}

fn normalized_json_pointer(pointer: &str) -> String {
    if pointer.is_empty() {
        "/".to_string()
    } else {
        pointer.to_string()
    }
}
