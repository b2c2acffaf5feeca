// src/forms/handlers/fields.rs

use axum::extract::{Extension, Json, Path};
use serde_json::json;
use sqlx::{QueryBuilder, Sqlite};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::auth::AuthedUser;
use crate::common::error::is_unique_violation;
use crate::common::{ApiError, AppState, Validator};
use crate::forms::models::*;
use crate::forms::queries::{all_fields, ensure_section, field_by_id};
use crate::forms::schema::{add_application_column, drop_application_column, normalize_field_name};
use crate::forms::validators::{check_options, FieldDefinitionValidator};

/// GET /api/form/config
pub async fn list_fields(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<Vec<FormField>>, ApiError> {
    authed.require_admin()?;
    let state = state_lock.read().await.clone();

    let fields = all_fields(&state.db).await?;
    Ok(Json(fields))
}

/// POST /api/form/config
///
/// Adds the backing column and the config row in one transaction, so a
/// failure leaves neither behind.
pub async fn create_field(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(payload): Json<CreateFieldRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    authed.require_admin()?;
    FieldDefinitionValidator.validate(&payload).into_result()?;

    let state = state_lock.read().await.clone();

    let name = payload.name.as_deref().map(normalize_field_name).unwrap_or_default();
    let label = payload.label.as_deref().unwrap_or_default().trim().to_string();
    let field_type = payload
        .field_type
        .as_deref()
        .and_then(FieldType::parse)
        .ok_or_else(|| ApiError::ValidationError("Unknown field type".to_string()))?;
    let subsection = payload.subsection.as_deref().unwrap_or_default().trim().to_string();
    let options = payload
        .options
        .as_deref()
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string);
    let validations = payload
        .validations
        .as_ref()
        .map(validations_text)
        .unwrap_or_else(|| "{}".to_string());

    let mut tx = state.db.begin().await?;

    let max_order: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(field_order), 0) FROM form_config")
        .fetch_one(&mut *tx)
        .await?;

    add_application_column(&mut tx, &name).await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO form_config (name, label, type, subsection, options, required, is_core, field_order, validations)
        VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?)
        "#,
    )
    .bind(&name)
    .bind(&label)
    .bind(field_type.as_str())
    .bind(&subsection)
    .bind(&options)
    .bind(payload.required.unwrap_or(false))
    .bind(max_order + 1)
    .bind(&validations)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::Conflict(format!("A field with the name '{}' already exists.", name))
        } else {
            ApiError::DatabaseError(e)
        }
    })?;

    ensure_section(&mut *tx, &subsection).await?;
    tx.commit().await?;

    info!(
        field_id = inserted.last_insert_rowid(),
        field = %name,
        field_type = field_type.as_str(),
        subsection = %subsection,
        "Form field added"
    );

    Ok(Json(json!({
        "success": true,
        "message": "Field added successfully.",
        "id": inserted.last_insert_rowid(),
        "name": name,
    })))
}

/// PUT /api/form/config/:id
/// Partial update; the column name of a field never changes
pub async fn update_field(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(field_id): Path<i64>,
    Json(payload): Json<UpdateFieldRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    authed.require_admin()?;
    let state = state_lock.read().await.clone();

    let existing = field_by_id(&state.db, field_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Field not found.".to_string()))?;

    if payload.is_empty() {
        return Err(ApiError::BadRequest("No fields to update.".to_string()));
    }

    let mut result = FieldDefinitionValidator.validate(&payload);
    let new_type = payload
        .field_type
        .as_deref()
        .and_then(FieldType::parse)
        .unwrap_or(existing.field_type);
    if payload.field_type.is_some() && payload.options.is_none() {
        check_options(&mut result, new_type, existing.options.as_deref());
    }
    result.into_result()?;

    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE form_config SET ");
    let mut set = query.separated(", ");
    if let Some(label) = &payload.label {
        set.push("label = ").push_bind_unseparated(label.trim().to_string());
    }
    if payload.field_type.is_some() {
        set.push("type = ").push_bind_unseparated(new_type.as_str());
    }
    if let Some(subsection) = &payload.subsection {
        set.push("subsection = ").push_bind_unseparated(subsection.trim().to_string());
    }
    if let Some(options) = &payload.options {
        let options = Some(options.trim().to_string()).filter(|o| !o.is_empty());
        set.push("options = ").push_bind_unseparated(options);
    }
    if let Some(required) = payload.required {
        set.push("required = ").push_bind_unseparated(required);
    }
    if let Some(validations) = &payload.validations {
        set.push("validations = ").push_bind_unseparated(validations_text(validations));
    }
    query.push(" WHERE id = ").push_bind(field_id);

    let mut tx = state.db.begin().await?;
    query.build().execute(&mut *tx).await?;
    if let Some(subsection) = payload.subsection.as_deref().map(str::trim) {
        if !subsection.is_empty() {
            ensure_section(&mut *tx, subsection).await?;
        }
    }
    tx.commit().await?;

    info!(field_id = field_id, field = %existing.name, "Form field updated");
    Ok(Json(json!({
        "success": true,
        "message": "Field updated successfully."
    })))
}

/// DELETE /api/form/config/:id
/// Drops the backing column (rebuilding the table) and the config row together
pub async fn delete_field(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(field_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    authed.require_admin()?;
    let state = state_lock.read().await.clone();

    let field = field_by_id(&state.db, field_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Field not found.".to_string()))?;

    if field.is_core {
        warn!(field = %field.name, "Refused to delete core field");
        return Err(ApiError::BadRequest("Core fields cannot be deleted.".to_string()));
    }

    let mut tx = state.db.begin().await?;
    let dropped = drop_application_column(&mut tx, &field.name).await?;
    sqlx::query("DELETE FROM form_config WHERE id = ?")
        .bind(field_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    info!(
        field_id = field_id,
        field = %field.name,
        column_dropped = dropped,
        "Form field deleted"
    );
    Ok(Json(json!({
        "success": true,
        "message": "Field deleted successfully."
    })))
}

/// POST /api/form/config/reorder
pub async fn reorder_fields(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(payload): Json<ReorderFieldsRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    authed.require_admin()?;
    let state = state_lock.read().await.clone();

    let mut tx = state.db.begin().await?;
    for (field_id, order) in &payload.field_orders {
        sqlx::query("UPDATE form_config SET field_order = ? WHERE id = ?")
            .bind(order)
            .bind(field_id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    info!(count = payload.field_orders.len(), "Form fields reordered");
    Ok(Json(json!({
        "success": true,
        "message": "Field order updated successfully."
    })))
}

/// POST /api/form/config/bulk-update
/// Sets `required` and `field_order` for every entry carrying an id
pub async fn bulk_update_fields(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(payload): Json<BulkUpdateRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    authed.require_admin()?;
    let state = state_lock.read().await.clone();

    let mut tx = state.db.begin().await?;
    let mut updated = 0usize;
    for update in payload.updates.iter() {
        let Some(field_id) = update.id else {
            continue;
        };
        sqlx::query("UPDATE form_config SET required = ?, field_order = ? WHERE id = ?")
            .bind(update.required.unwrap_or(false))
            .bind(update.field_order.unwrap_or(0))
            .bind(field_id)
            .execute(&mut *tx)
            .await?;
        updated += 1;
    }
    tx.commit().await?;

    info!(updated = updated, "Form fields bulk-updated");
    Ok(Json(json!({
        "success": true,
        "message": "Fields updated successfully."
    })))
}
