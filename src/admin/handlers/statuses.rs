// src/admin/handlers/statuses.rs

use axum::{extract::Extension, Json};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::admin::models::UpdateStatusRequest;
use crate::admin::validators::StatusUpdateValidator;
use crate::auth::AuthedUser;
use crate::common::{safe_email_log, ApiError, AppState, Validator};

/// POST /api/update_status - Set the hiring status for an applicant email
///
/// Statuses are keyed by lower-cased email and survive deletion of the
/// application row.
pub async fn update_status(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, ApiError> {
    authed.require_admin()?;

    let email = request
        .email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .unwrap_or_default();
    let status = request
        .status
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();
    if email.is_empty() || status.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and status are required.".to_string(),
        ));
    }
    StatusUpdateValidator.validate(&request).into_result()?;

    let state = state_lock.read().await.clone();
    sqlx::query(
        r#"
        INSERT INTO statuses (email, name, status) VALUES (?, ?, ?)
        ON CONFLICT(email) DO UPDATE SET name = excluded.name, status = excluded.status
        "#,
    )
    .bind(&email)
    .bind(request.name.as_deref().map(str::trim))
    .bind(&status)
    .execute(&state.db)
    .await?;

    info!(
        updated_by = authed.id,
        email = %safe_email_log(&email),
        status = %status,
        "Applicant status updated"
    );

    Ok(Json(json!({ "success": true })))
}
