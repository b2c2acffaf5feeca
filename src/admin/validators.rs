// src/admin/validators.rs

use crate::admin::models::{CreateUserRequest, HiringStatus, UpdateStatusRequest};
use crate::applications::validators::is_valid_email;
use crate::common::{ValidationResult, Validator};

pub struct StatusUpdateValidator;

impl Validator<UpdateStatusRequest> for StatusUpdateValidator {
    fn validate(&self, data: &UpdateStatusRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Some(status) = data.status.as_deref().map(str::trim) {
            if HiringStatus::parse(status).is_none() {
                let allowed: Vec<&str> = HiringStatus::ALL.iter().map(|s| s.as_str()).collect();
                result.add_error(
                    "status",
                    &format!("Status must be one of: {}", allowed.join(", ")),
                );
            }
        }

        result
    }
}

const MIN_PASSWORD_CHARS: usize = 4;

pub struct NewViewerValidator;

impl Validator<CreateUserRequest> for NewViewerValidator {
    fn validate(&self, data: &CreateUserRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        let email = data.email.as_deref().map(str::trim).unwrap_or_default();
        if !email.is_empty() && !is_valid_email(email) {
            result.add_error("email", "Email must be a valid email address");
        }
        if data.password.as_deref().is_some_and(|p| p.chars().count() < MIN_PASSWORD_CHARS) {
            result.add_error(
                "password",
                &format!("Password must be at least {} characters", MIN_PASSWORD_CHARS),
            );
        }

        result
    }
}
