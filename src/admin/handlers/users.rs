// src/admin/handlers/users.rs

use axum::{
    extract::{Extension, Path},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::admin::models::{CreateUserRequest, DeleteUserRequest};
use crate::admin::validators::NewViewerValidator;
use crate::auth::models::UserSummary;
use crate::auth::password::hash_password;
use crate::auth::AuthedUser;
use crate::common::error::is_unique_violation;
use crate::common::{safe_email_log, ApiError, AppState, Validator};

/// GET /api/users - Dashboard accounts, admins first
pub async fn list_users(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    authed.require_admin()?;
    let state = state_lock.read().await.clone();

    let users = sqlx::query_as::<_, UserSummary>(
        "SELECT id, email, role FROM users ORDER BY role, email",
    )
    .fetch_all(&state.db)
    .await
    .map_err(|e| {
        error!(error = %e, "Database error fetching users list");
        ApiError::DatabaseError(e)
    })?;

    Ok(Json(users))
}

/// POST /api/users - Create a viewer account
pub async fn create_viewer(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<Value>, ApiError> {
    authed.require_admin()?;

    let email = request
        .email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .unwrap_or_default();
    let password = request.password.clone().unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required.".to_string(),
        ));
    }
    NewViewerValidator.validate(&request).into_result()?;

    let password_hash = hash_password(&password)?;

    let state = state_lock.read().await.clone();
    let result = sqlx::query("INSERT INTO users (email, password_hash, role) VALUES (?, ?, 'viewer')")
        .bind(&email)
        .bind(&password_hash)
        .execute(&state.db)
        .await;

    let user_id = match result {
        Ok(done) => done.last_insert_rowid(),
        Err(e) if is_unique_violation(&e) => {
            warn!(email = %safe_email_log(&email), "Viewer creation rejected: email in use");
            return Err(ApiError::Conflict(format!(
                "User with email '{}' already exists.",
                email
            )));
        }
        Err(e) => return Err(ApiError::DatabaseError(e)),
    };

    info!(
        created_by = authed.id,
        user_id = user_id,
        email = %safe_email_log(&email),
        "Viewer account created"
    );

    Ok(Json(json!({
        "success": true,
        "message": "Viewer added successfully.",
        "id": user_id
    })))
}

async fn remove_user(
    state_lock: &Arc<RwLock<AppState>>,
    authed: &AuthedUser,
    user_id: i64,
) -> Result<Json<Value>, ApiError> {
    if user_id == authed.id {
        warn!(user_id = user_id, "Admin attempted to delete their own account");
        return Err(ApiError::BadRequest(
            "Admin cannot delete their own account.".to_string(),
        ));
    }

    let state = state_lock.read().await.clone();
    let deleted = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(&state.db)
        .await?
        .rows_affected();
    if deleted == 0 {
        return Err(ApiError::NotFound("User not found.".to_string()));
    }

    info!(deleted_by = authed.id, user_id = user_id, "User deleted");
    Ok(Json(json!({
        "success": true,
        "message": "User deleted."
    })))
}

/// POST /api/users/delete - `{ "id": <user id> }`
pub async fn delete_user_by_body(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<DeleteUserRequest>,
) -> Result<Json<Value>, ApiError> {
    authed.require_admin()?;
    let user_id = request
        .id
        .ok_or_else(|| ApiError::BadRequest("User ID is required.".to_string()))?;
    remove_user(&state_lock, &authed, user_id).await
}

/// DELETE /api/users/:id
pub async fn delete_user(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(user_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    authed.require_admin()?;
    remove_user(&state_lock, &authed, user_id).await
}
