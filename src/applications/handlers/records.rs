// src/applications/handlers/records.rs

use axum::extract::{Extension, Json, Path};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::applications::store::{application_by_id, status_for, text_value};
use crate::applications::uploads::{remove_resume, resolve_stored_path};
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState};

/// GET /api/applications/:id
/// One application with its current status
pub async fn get_application(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _authed: AuthedUser,
    Path(application_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let mut row = application_by_id(&state.db, application_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Application not found.".to_string()))?;

    let status = status_for(&state.db, &text_value(&row, "email")).await?;
    row.insert("Status".to_string(), Value::String(status));

    Ok(Json(Value::Object(row)))
}

/// DELETE /api/applications/:id
/// Removes the row and its resume; the applicant's status entry is kept
pub async fn delete_application(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(application_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    authed.require_admin()?;
    let state = state_lock.read().await.clone();

    let row = application_by_id(&state.db, application_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Application not found.".to_string()))?;

    sqlx::query("DELETE FROM applications WHERE id = ?")
        .bind(application_id)
        .execute(&state.db)
        .await?;

    let resume = text_value(&row, "resume_path");
    if resolve_stored_path(&state.upload_dir, &resume).is_some() {
        remove_resume(&state.upload_dir, &resume).await;
    }

    info!(
        application_id = application_id,
        deleted_by = authed.id,
        "Application deleted"
    );
    Ok(Json(json!({
        "success": true,
        "message": "Application deleted."
    })))
}
