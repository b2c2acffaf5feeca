// src/applications/handlers/files.rs
//! Resume file serving

use axum::{
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::IntoResponse,
};
use std::io::ErrorKind;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, warn};

use crate::applications::uploads::{content_type_for, resolve_stored_path};
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState};

/// GET /uploads/:filename - Serve a stored resume to signed-in reviewers
pub async fn serve_resume(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await;

    let file_path = resolve_stored_path(&state.upload_dir, &filename).ok_or_else(|| {
        warn!(user_id = authed.id, requested = %filename, "Rejected resume path");
        ApiError::NotFound("File not found".to_string())
    })?;

    let content = tokio::fs::read(&file_path).await.map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            ApiError::NotFound("File not found".to_string())
        } else {
            error!(error = %e, file = %filename, "Failed to read resume");
            ApiError::InternalServer("Failed to read file".to_string())
        }
    })?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type_for(&filename).to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", filename),
            ),
        ],
        content,
    ))
}
