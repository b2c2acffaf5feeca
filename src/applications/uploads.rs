// src/applications/uploads.rs
//! Resume checks, naming and storage on local disk

use chrono::{DateTime, Utc};
use infer::MatcherType;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{error, warn};

use crate::common::helpers::{file_extension, secure_filename};
use crate::common::ApiError;

/// Rejects resumes by extension and by detected content.
///
/// Content that cannot be identified passes; content identified as media,
/// an executable or a font fails, and a `.pdf` must carry the PDF signature.
pub fn check_resume(
    file_name: &str,
    data: &[u8],
    allowed: &HashSet<String>,
    allowed_display: &str,
) -> Result<String, ApiError> {
    let extension = file_extension(file_name)
        .filter(|ext| allowed.contains(ext))
        .ok_or_else(|| ApiError::ValidationFailed {
            message: "Invalid file type".to_string(),
            details: vec![format!(
                "Please upload a file with one of these extensions: {}",
                allowed_display
            )],
        })?;

    if data.is_empty() {
        return Err(ApiError::BadRequest("Resume file is empty".to_string()));
    }

    let detected = infer::get(data);
    if let Some(kind) = &detected {
        if matches!(
            kind.matcher_type(),
            MatcherType::Image
                | MatcherType::Video
                | MatcherType::Audio
                | MatcherType::App
                | MatcherType::Font
        ) {
            warn!(
                extension = %extension,
                detected = kind.mime_type(),
                "Rejected resume with non-document content"
            );
            return Err(ApiError::ValidationError(format!(
                "File content does not match a .{} document",
                extension
            )));
        }
    }

    if extension == "pdf" && detected.map(|k| k.mime_type()) != Some("application/pdf") {
        warn!("Rejected .pdf resume without a PDF signature");
        return Err(ApiError::ValidationError(
            "File content does not match a .pdf document".to_string(),
        ));
    }

    Ok(extension)
}

/// `<email>_<YYYYmmdd_HHMMSS>_<file name>`, every part sanitized
pub fn stored_file_name(email: &str, original: &str, extension: &str, at: DateTime<Utc>) -> String {
    let email = Some(secure_filename(email))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string());
    let original = Some(secure_filename(original))
        .filter(|s| file_extension(s).as_deref() == Some(extension))
        .unwrap_or_else(|| format!("resume.{}", extension));

    format!("{}_{}_{}", email, at.format("%Y%m%d_%H%M%S"), original)
}

/// Writes a new file; never overwrites an existing resume
pub async fn save_resume(dir: &Path, name: &str, data: &[u8]) -> Result<PathBuf, ApiError> {
    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        error!(error = %e, dir = %dir.display(), "Failed to create upload directory");
        ApiError::InternalServer("Failed to save resume".to_string())
    })?;

    let path = dir.join(name);
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
        .map_err(|e| {
            if e.kind() == ErrorKind::AlreadyExists {
                warn!(file = %name, "Resume with the same stored name already exists");
                ApiError::Conflict("Duplicate application".to_string())
            } else {
                error!(error = %e, file = %name, "Failed to create resume file");
                ApiError::InternalServer("Failed to save resume".to_string())
            }
        })?;

    let written = async {
        file.write_all(data).await?;
        file.flush().await
    }
    .await;

    if let Err(e) = written {
        error!(error = %e, file = %name, "Failed to write resume");
        remove_resume(dir, name).await;
        return Err(ApiError::InternalServer("Failed to save resume".to_string()));
    }
    Ok(path)
}

pub async fn remove_resume(dir: &Path, name: &str) {
    if let Err(e) = tokio::fs::remove_file(dir.join(name)).await {
        if e.kind() != ErrorKind::NotFound {
            warn!(error = %e, file = %name, "Failed to remove resume file");
        }
    }
}

/// Path of a stored resume, or `None` when the requested name is not one
/// this service could have produced
pub fn resolve_stored_path(dir: &Path, requested: &str) -> Option<PathBuf> {
    let safe = secure_filename(requested);
    if safe.is_empty() || safe != requested {
        return None;
    }
    Some(dir.join(safe))
}

pub fn content_type_for(file_name: &str) -> &'static str {
    match file_extension(file_name).as_deref() {
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}
