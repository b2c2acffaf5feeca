// src/forms/validators.rs

use regex::Regex;

use super::models::*;
use super::schema::{normalize_field_name, validate_column_name};
use crate::common::{ValidationResult, Validator};

// ============================================================================
// Field Definition Validators
// ============================================================================

pub struct FieldDefinitionValidator;

impl Validator<CreateFieldRequest> for FieldDefinitionValidator {
    fn validate(&self, data: &CreateFieldRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        let name = data.name.as_deref().map(normalize_field_name).unwrap_or_default();
        let label = data.label.as_deref().map(str::trim).unwrap_or_default();
        let field_type = data.field_type.as_deref().map(str::trim).unwrap_or_default();
        let subsection = data.subsection.as_deref().map(str::trim).unwrap_or_default();

        if name.is_empty() || label.is_empty() || field_type.is_empty() || subsection.is_empty() {
            result.add_error(
                "name",
                "Name, label, type, and subsection are required.",
            );
            return result;
        }

        if let Err(e) = validate_column_name(&name) {
            result.add_error("name", &e.to_string());
        }

        match FieldType::parse(field_type) {
            Some(kind) => check_options(&mut result, kind, data.options.as_deref()),
            None => result.add_error("type", &unknown_type_message(field_type)),
        }

        if let Some(validations) = &data.validations {
            check_rules(&mut result, &validations_text(validations));
        }

        result
    }
}

impl Validator<UpdateFieldRequest> for FieldDefinitionValidator {
    fn validate(&self, data: &UpdateFieldRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Some(label) = &data.label {
            if label.trim().is_empty() {
                result.add_error("label", "Label cannot be empty.");
            }
        }

        if let Some(field_type) = &data.field_type {
            match FieldType::parse(field_type) {
                Some(kind) if data.options.is_some() => {
                    check_options(&mut result, kind, data.options.as_deref())
                }
                Some(_) => {}
                None => result.add_error("type", &unknown_type_message(field_type)),
            }
        }

        if let Some(validations) = &data.validations {
            check_rules(&mut result, &validations_text(validations));
        }

        result
    }
}

pub fn check_options(result: &mut ValidationResult, kind: FieldType, options: Option<&str>) {
    if kind.needs_options() && split_options(options.unwrap_or("")).is_empty() {
        result.add_error(
            "options",
            &format!("Fields of type '{}' need at least one option.", kind.as_str()),
        );
    }
}

fn check_rules(result: &mut ValidationResult, text: &str) {
    let rules = match ValidationRules::parse(text) {
        Ok(rules) => rules,
        Err(_) => {
            result.add_error("validations", "Validations must be a JSON object.");
            return;
        }
    };

    if let Some(pattern) = &rules.pattern {
        if Regex::new(pattern).is_err() {
            result.add_error("validations", "Validation pattern is not a valid regular expression.");
        }
    }
    if let (Some(min), Some(max)) = (rules.min_length, rules.max_length) {
        if min > max {
            result.add_error("validations", "min_length cannot exceed max_length.");
        }
    }
    if let (Some(min), Some(max)) = (rules.min, rules.max) {
        if min > max {
            result.add_error("validations", "min cannot exceed max.");
        }
    }
}

fn unknown_type_message(value: &str) -> String {
    let known: Vec<&str> = FieldType::ALL.iter().map(|t| t.as_str()).collect();
    format!(
        "Unknown field type '{}'. Expected one of: {}",
        value,
        known.join(", ")
    )
}
