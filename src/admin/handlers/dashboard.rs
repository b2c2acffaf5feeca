// src/admin/handlers/dashboard.rs

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::admin::models::{
    DailyCount, HealthResponse, PositionCount, ReportFilters, StatisticsResponse,
    SubmissionStatistics,
};
use crate::admin::reports::{build_dashboard, load_source, POST_COLUMN};
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState};
use crate::forms::schema::application_columns;

/// GET /api/data - Filtered KPIs, charts and table rows for the dashboard
pub async fn get_dashboard_data(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Query(filters): Query<ReportFilters>,
) -> Result<Response, ApiError> {
    let state = state_lock.read().await.clone();

    let source = load_source(&state.db).await.map_err(|e| {
        error!(error = %e, "Database error loading dashboard data");
        ApiError::DatabaseError(e)
    })?;

    if source.is_empty() {
        return Ok(Json(json!({
            "kpis": {},
            "charts": {},
            "table_data": [],
            "all_columns": [],
            "default_columns": [],
            "filters": {}
        }))
        .into_response());
    }

    let data = build_dashboard(&source, &filters)?;

    info!(
        user_id = authed.id,
        total_rows = source.rows.len(),
        matched_rows = data.table_data.len(),
        "Dashboard data served"
    );

    Ok(Json(data).into_response())
}

/// GET /api/statistics - Public submission counters
pub async fn get_statistics(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<Json<StatisticsResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let total_applications = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM applications")
        .fetch_one(&state.db)
        .await?;

    let recent_submissions = sqlx::query_as::<_, DailyCount>(
        r#"
        SELECT DATE(submission_timestamp) AS date, COUNT(*) AS count
        FROM applications
        WHERE submission_timestamp >= datetime('now', '-30 days')
        GROUP BY DATE(submission_timestamp)
        ORDER BY date DESC
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    let columns = application_columns(&state.db).await?;
    let popular_positions = if columns.iter().any(|c| c == POST_COLUMN) {
        sqlx::query_as::<_, PositionCount>(
            r#"
            SELECT post_applying_for, COUNT(*) AS count
            FROM applications
            WHERE post_applying_for IS NOT NULL AND post_applying_for != ''
            GROUP BY post_applying_for
            ORDER BY count DESC, post_applying_for ASC
            LIMIT 10
            "#,
        )
        .fetch_all(&state.db)
        .await?
    } else {
        Vec::new()
    };

    Ok(Json(StatisticsResponse {
        success: true,
        statistics: SubmissionStatistics {
            total_applications,
            recent_submissions,
            popular_positions,
        },
        timestamp: Utc::now().to_rfc3339(),
    }))
}

/// GET /health - Liveness plus a database probe
pub async fn health_check(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> (StatusCode, Json<HealthResponse>) {
    let db = state_lock.read().await.db.clone();
    let timestamp = Utc::now().to_rfc3339();

    match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(&db).await {
        Ok(_) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                timestamp,
                database: "connected",
            }),
        ),
        Err(e) => {
            error!(error = %e, "Database health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy",
                    timestamp,
                    database: "disconnected",
                }),
            )
        }
    }
}
