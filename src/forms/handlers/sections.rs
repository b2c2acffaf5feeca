// src/forms/handlers/sections.rs

use axum::extract::{Extension, Json, Path};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::auth::AuthedUser;
use crate::common::error::is_unique_violation;
use crate::common::{ApiError, AppState};
use crate::forms::models::*;

const DUPLICATE_SECTION: &str = "Section with this name already exists.";

fn duplicate_section(e: sqlx::Error) -> ApiError {
    if is_unique_violation(&e) {
        ApiError::BadRequest(DUPLICATE_SECTION.to_string())
    } else {
        ApiError::DatabaseError(e)
    }
}

fn icon_or_default(icon: Option<&str>) -> String {
    icon.map(str::trim)
        .filter(|i| !i.is_empty())
        .unwrap_or("folder")
        .to_string()
}

/// GET /api/form/sections
///
/// Section rows when any exist, otherwise the distinct subsection names in
/// use by fields.
pub async fn list_sections(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    authed.require_admin()?;
    let state = state_lock.read().await.clone();

    let sections = sqlx::query_as::<_, FormSection>(
        r#"
        SELECT name, COALESCE(section_order, 0) AS section_order, description, icon
        FROM form_sections
        ORDER BY section_order, name
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    if !sections.is_empty() {
        return Ok(Json(json!(sections)));
    }

    let names: Vec<String> = sqlx::query_scalar(
        "SELECT DISTINCT subsection FROM form_config WHERE subsection IS NOT NULL ORDER BY subsection",
    )
    .fetch_all(&state.db)
    .await?;
    Ok(Json(json!(names)))
}

/// POST /api/form/sections
pub async fn create_section(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(payload): Json<CreateSectionRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    authed.require_admin()?;

    let name = payload.name.as_deref().unwrap_or_default().trim().to_string();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Section name is required.".to_string()));
    }
    let description = payload.description.as_deref().unwrap_or_default().trim().to_string();
    let icon = icon_or_default(payload.icon.as_deref());

    let state = state_lock.read().await.clone();
    sqlx::query(
        r#"
        INSERT INTO form_sections (name, section_order, description, icon)
        SELECT ?, COALESCE(MAX(section_order), 0) + 1, ?, ? FROM form_sections
        "#,
    )
    .bind(&name)
    .bind(&description)
    .bind(&icon)
    .execute(&state.db)
    .await
    .map_err(duplicate_section)?;

    info!(section = %name, "Form section created");
    Ok(Json(json!({
        "success": true,
        "message": "Section created successfully."
    })))
}

/// PUT /api/form/sections/:name
///
/// Creates the row when the section only existed through its fields. A rename
/// moves every field of the old section along.
pub async fn update_section(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(section_name): Path<String>,
    Json(payload): Json<UpdateSectionRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    authed.require_admin()?;

    let new_name = payload.name.as_deref().unwrap_or_default().trim().to_string();
    let target_name = if new_name.is_empty() {
        section_name.clone()
    } else {
        new_name.clone()
    };
    let description = payload.description.as_deref().unwrap_or_default().trim().to_string();
    let icon = icon_or_default(payload.icon.as_deref());

    let state = state_lock.read().await.clone();
    let mut tx = state.db.begin().await?;

    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM form_sections WHERE name = ?")
        .bind(&section_name)
        .fetch_optional(&mut *tx)
        .await?;

    if existing.is_some() {
        sqlx::query("UPDATE form_sections SET name = ?, description = ?, icon = ? WHERE name = ?")
            .bind(&target_name)
            .bind(&description)
            .bind(&icon)
            .bind(&section_name)
            .execute(&mut *tx)
            .await
            .map_err(duplicate_section)?;
    } else {
        sqlx::query(
            r#"
            INSERT INTO form_sections (name, section_order, description, icon)
            SELECT ?, COALESCE(MAX(section_order), 0) + 1, ?, ? FROM form_sections
            "#,
        )
        .bind(&target_name)
        .bind(&description)
        .bind(&icon)
        .execute(&mut *tx)
        .await
        .map_err(duplicate_section)?;
    }

    let mut moved_fields = 0;
    if !new_name.is_empty() && new_name != section_name {
        moved_fields = sqlx::query("UPDATE form_config SET subsection = ? WHERE subsection = ?")
            .bind(&new_name)
            .bind(&section_name)
            .execute(&mut *tx)
            .await?
            .rows_affected();
    }
    tx.commit().await?;

    info!(
        section = %section_name,
        new_name = %target_name,
        moved_fields = moved_fields,
        "Form section updated"
    );
    Ok(Json(json!({
        "success": true,
        "message": "Section updated successfully."
    })))
}

/// DELETE /api/form/sections/:name
/// Only empty sections can be removed
pub async fn delete_section(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(section_name): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    authed.require_admin()?;
    let state = state_lock.read().await.clone();

    let field_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM form_config WHERE subsection = ?")
        .bind(&section_name)
        .fetch_one(&state.db)
        .await?;

    if field_count > 0 {
        warn!(section = %section_name, field_count = field_count, "Refused to delete non-empty section");
        return Err(ApiError::BadRequest(format!(
            "Cannot delete section '{}' because it contains {} field(s). Please move or delete the fields first.",
            section_name, field_count
        )));
    }

    sqlx::query("DELETE FROM form_sections WHERE name = ?")
        .bind(&section_name)
        .execute(&state.db)
        .await?;

    info!(section = %section_name, "Form section deleted");
    Ok(Json(json!({
        "success": true,
        "message": "Section deleted successfully."
    })))
}

/// POST /api/form/sections/reorder
/// `{"sections": [name, ...]}`; each name is placed at its index + 1
pub async fn reorder_sections(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(payload): Json<ReorderSectionsRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    authed.require_admin()?;

    if payload.sections.is_empty() {
        return Err(ApiError::BadRequest(
            "No sections provided for reordering.".to_string(),
        ));
    }

    let state = state_lock.read().await.clone();
    let mut tx = state.db.begin().await?;
    for (index, name) in payload.sections.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO form_sections (name, section_order, icon, description)
            VALUES (?, ?, 'folder', '')
            ON CONFLICT(name) DO UPDATE SET section_order = excluded.section_order
            "#,
        )
        .bind(name)
        .bind(index as i64 + 1)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    info!(count = payload.sections.len(), "Form sections reordered");
    Ok(Json(json!({
        "success": true,
        "message": "Sections reordered successfully."
    })))
}
