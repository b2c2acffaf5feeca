// src/applications/validators.rs

use chrono::NaiveDate;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::warn;

use crate::common::{ValidationResult, Validator};
use crate::forms::models::{split_options, FieldType, FormField};

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
    })
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[\+]?[0-9\s\-\(\)]{10,15}$").expect("valid phone regex"))
}

pub fn is_valid_email(value: &str) -> bool {
    email_pattern().is_match(value)
}

fn is_valid_url(value: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        value
            .strip_prefix(scheme)
            .map(|rest| {
                let host = rest.split(['/', '?', '#']).next().unwrap_or("");
                !host.is_empty() && !rest.contains(char::is_whitespace)
            })
            .unwrap_or(false)
    })
}

fn format_bound(value: f64) -> String {
    format!("{}", value)
}

// ============================================================================
// Submission Validator
// ============================================================================

/// Checks a submitted form against the configured fields
pub struct SubmissionValidator<'a> {
    pub fields: &'a [FormField],
}

impl<'a> Validator<HashMap<String, String>> for SubmissionValidator<'a> {
    fn validate(&self, data: &HashMap<String, String>) -> ValidationResult {
        let mut result = ValidationResult::new();

        for field in self.fields {
            let value = data.get(&field.name).map(|v| v.trim()).unwrap_or("");
            let label = &field.label;

            if value.is_empty() {
                if field.required {
                    result.add_error(&field.name, &format!("{} is required", label));
                }
                continue;
            }

            match field.field_type {
                FieldType::Email if !is_valid_email(value) => {
                    result.add_error(&field.name, &format!("{} must be a valid email address", label));
                }
                FieldType::Tel if !phone_pattern().is_match(value) => {
                    result.add_error(&field.name, &format!("{} must be a valid phone number", label));
                }
                FieldType::Number if value.parse::<f64>().is_err() => {
                    result.add_error(&field.name, &format!("{} must be a valid number", label));
                }
                FieldType::Date if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() => {
                    result.add_error(&field.name, &format!("{} must be a valid date", label));
                }
                FieldType::Url if !is_valid_url(value) => {
                    result.add_error(&field.name, &format!("{} must be a valid URL", label));
                }
                FieldType::Select | FieldType::Radio => {
                    let options = field.option_list();
                    if !options.is_empty() && !options.iter().any(|o| o == value) {
                        result.add_error(
                            &field.name,
                            &format!("{} must be one of: {}", label, options.join(", ")),
                        );
                    }
                }
                FieldType::Checkbox => {
                    let options = field.option_list();
                    if !options.is_empty()
                        && !split_options(value).iter().all(|v| options.contains(v))
                    {
                        result.add_error(
                            &field.name,
                            &format!("{} must be chosen from: {}", label, options.join(", ")),
                        );
                    }
                }
                _ => {}
            }

            if result.has_error_for(&field.name) {
                continue;
            }
            check_rules(&mut result, field, value);
        }

        result
    }
}

fn check_rules(result: &mut ValidationResult, field: &FormField, value: &str) {
    let rules = field.rules();
    let label = &field.label;
    let length = value.chars().count();
    let custom = rules.error_message.as_deref().map(str::trim).filter(|m| !m.is_empty());
    let mut fail = |generated: String| {
        result.add_error(&field.name, custom.unwrap_or(generated.as_str()));
    };

    if let Some(min) = rules.min_length {
        if length < min {
            fail(format!("{} must be at least {} characters", label, min));
        }
    }
    if let Some(max) = rules.max_length {
        if length > max {
            fail(format!("{} must be at most {} characters", label, max));
        }
    }
    if let Some(pattern) = &rules.pattern {
        match Regex::new(&format!("^(?:{})$", pattern)) {
            Ok(re) if !re.is_match(value) => fail(format!("{} has an invalid format", label)),
            Ok(_) => {}
            Err(e) => warn!(field = %field.name, error = %e, "Ignoring invalid validation pattern"),
        }
    }
    if rules.min.is_some() || rules.max.is_some() {
        match value.parse::<f64>() {
            Ok(number) => {
                if let Some(min) = rules.min.filter(|min| number < *min) {
                    fail(format!("{} must be at least {}", label, format_bound(min)));
                }
                if let Some(max) = rules.max.filter(|max| number > *max) {
                    fail(format!("{} must be at most {}", label, format_bound(max)));
                }
            }
            Err(_) => fail(format!("{} must be a valid number", label)),
        }
    }
}
