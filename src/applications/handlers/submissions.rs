// src/applications/handlers/submissions.rs
//! Public application intake

use axum::{
    extract::{multipart::{MultipartError, MultipartRejection}, Extension, Json, Multipart},
    http::StatusCode,
};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::applications::models::{Submission, SubmissionResponse, UploadedResume, RESUME_PART};
use crate::applications::store::{email_exists, insert_application};
use crate::applications::uploads::{check_resume, remove_resume, save_resume, stored_file_name};
use crate::applications::validators::SubmissionValidator;
use crate::common::error::is_unique_violation;
use crate::common::{safe_email_log, ApiError, AppState, Validator};
use crate::forms::queries::all_fields;
use crate::forms::schema::application_columns;

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("Submission rejected: body exceeds upload limit");
        ApiError::PayloadTooLarge("File too large".to_string())
    } else {
        debug!(error = %e, "Unreadable multipart body");
        ApiError::BadRequest(format!("Invalid form submission: {}", e.body_text()))
    }
}

async fn read_submission(multipart: &mut Multipart) -> Result<Submission, ApiError> {
    let mut submission = Submission::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == RESUME_PART {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let data = field.bytes().await.map_err(multipart_error)?;
            submission.resume = Some(UploadedResume {
                file_name,
                data: data.to_vec(),
            });
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            submission.push_field(name, value);
        }
    }

    Ok(submission)
}

/// POST /api/submit-application (alias /api/submit_application)
///
/// Multipart form with the resume under `cv-resume` and one text part per
/// configured field. The resume is stored before the row is inserted and
/// removed again if the insert fails.
pub async fn submit_application(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        warn!(error = %e, "Submission is not multipart/form-data");
        ApiError::BadRequest("Expected a multipart/form-data submission".to_string())
    })?;
    let submission = read_submission(&mut multipart).await?;
    let state = state_lock.read().await.clone();

    // Resume checks
    let resume = submission
        .resume
        .as_ref()
        .ok_or_else(|| ApiError::BadRequest("Missing resume".to_string()))?;
    if resume.file_name.trim().is_empty() {
        return Err(ApiError::BadRequest("No file selected".to_string()));
    }
    let extension = check_resume(
        &resume.file_name,
        &resume.data,
        &state.config.allowed_extensions,
        &state.config.allowed_extensions_display(),
    )?;

    // Identity checks
    let name = submission.value("name").to_string();
    let email = submission.value("email").to_lowercase();
    if name.is_empty() || email.is_empty() {
        return Err(ApiError::ValidationFailed {
            message: "Missing required information".to_string(),
            details: vec!["Name and email are required fields".to_string()],
        });
    }

    let fields = all_fields(&state.db).await?;
    SubmissionValidator { fields: &fields }
        .validate(&submission.fields)
        .into_result()?;

    if email_exists(&state.db, &email).await? {
        info!(email = %safe_email_log(&email), "Duplicate application rejected");
        return Err(ApiError::Conflict("Duplicate application".to_string()));
    }

    // Only configured fields that have a column are stored
    let columns = application_columns(&state.db).await?;
    let mut values: Vec<(String, String)> = Vec::new();
    for field in &fields {
        if !columns.contains(&field.name) || !submission.fields.contains_key(&field.name) {
            continue;
        }
        let value = match field.name.as_str() {
            "email" => email.clone(),
            "name" => name.clone(),
            other => submission.value(other).to_string(),
        };
        values.push((field.name.clone(), value));
    }
    for (core, value) in [("name", &name), ("email", &email)] {
        if !values.iter().any(|(c, _)| c == core) {
            values.push((core.to_string(), value.clone()));
        }
    }

    let now = Utc::now();
    let stored_name = stored_file_name(&email, &resume.file_name, &extension, now);
    save_resume(&state.upload_dir, &stored_name, &resume.data).await?;

    values.push(("resume_path".to_string(), stored_name.clone()));
    values.push((
        "submission_timestamp".to_string(),
        now.format("%Y-%m-%d %H:%M:%S").to_string(),
    ));

    let inserted = async {
        let mut conn = state.db.acquire().await?;
        insert_application(&mut conn, &values).await
    }
    .await;

    let application_id = match inserted {
        Ok(id) => id,
        Err(e) => {
            remove_resume(&state.upload_dir, &stored_name).await;
            if is_unique_violation(&e) {
                info!(email = %safe_email_log(&email), "Duplicate application rejected at insert");
                return Err(ApiError::Conflict("Duplicate application".to_string()));
            }
            error!(error = %e, email = %safe_email_log(&email), "Failed to store application");
            return Err(ApiError::DatabaseError(e));
        }
    };

    info!(
        application_id = application_id,
        email = %safe_email_log(&email),
        resume = %stored_name,
        stored_fields = values.len(),
        "New application submitted"
    );

    Ok(Json(SubmissionResponse {
        success: true,
        message: "Application submitted successfully!".to_string(),
        application_id,
        submitted_at: now.to_rfc3339(),
    }))
}
