// src/applications/models.rs

use serde::Serialize;
use std::collections::HashMap;

/// Multipart part carrying the resume
pub const RESUME_PART: &str = "cv-resume";

/// Parsed multipart submission
#[derive(Debug, Default)]
pub struct Submission {
    pub fields: HashMap<String, String>,
    pub resume: Option<UploadedResume>,
}

#[derive(Debug)]
pub struct UploadedResume {
    pub file_name: String,
    pub data: Vec<u8>,
}

impl Submission {
    /// Repeated parts (checkbox groups) are joined with ", "
    pub fn push_field(&mut self, name: String, value: String) {
        self.fields
            .entry(name)
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }

    pub fn value(&self, name: &str) -> &str {
        self.fields.get(name).map(|v| v.trim()).unwrap_or("")
    }
}

#[derive(Serialize, Debug)]
pub struct SubmissionResponse {
    pub success: bool,
    pub message: String,
    pub application_id: i64,
    pub submitted_at: String,
}
