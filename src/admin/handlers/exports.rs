// src/admin/handlers/exports.rs

use axum::{
    extract::{Extension, Query},
    http::{header, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::admin::models::ExportParams;
use crate::admin::reports::{apply_filters, display_row, load_source, ordered_columns, to_csv};
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState};

/// GET /api/export?format=csv|json - Filtered application rows as a download
pub async fn export_applications(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Query(params): Query<ExportParams>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let format = params
        .format
        .as_deref()
        .map(|f| f.trim().to_lowercase())
        .unwrap_or_else(|| "csv".to_string());
    if format != "csv" && format != "json" {
        warn!(user_id = authed.id, format = %format, "Invalid export format requested");
        return Err(ApiError::BadRequest(
            "Invalid format. Use 'csv' or 'json'".to_string(),
        ));
    }

    let source = load_source(&state.db).await?;
    let rows: Vec<_> = apply_filters(&source, &params.filters)?
        .iter()
        .map(display_row)
        .collect();
    let columns = ordered_columns(&source);

    let (content_type, file_name, body) = if format == "csv" {
        let body = to_csv(&columns, &rows).map_err(|e| {
            error!(error = %e, "CSV serialization failed during export");
            ApiError::ExportError("Failed to build CSV export".to_string())
        })?;
        ("text/csv; charset=utf-8", "recruitment_data.csv", body)
    } else {
        let body = serde_json::to_vec_pretty(&rows).map_err(|e| {
            error!(error = %e, "JSON serialization failed during export");
            ApiError::ExportError("Failed to build JSON export".to_string())
        })?;
        ("application/json", "recruitment_data.json", body)
    };

    info!(
        user_id = authed.id,
        record_count = rows.len(),
        format = %format,
        "Applications exported"
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        body,
    ))
}
