// src/forms/handlers/public.rs
//! Unauthenticated form structure for the applicant page

use axum::extract::{Extension, Json};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::common::{ApiError, AppState};
use crate::forms::models::{FormConfigMetadata, FormConfigResponse, OrderedSections};
use crate::forms::queries::ordered_sections;

async fn load_sections(state_lock: &Arc<RwLock<AppState>>) -> Result<OrderedSections, ApiError> {
    let state = state_lock.read().await.clone();
    ordered_sections(&state.db).await.map_err(|e| {
        error!(error = %e, "Error loading form configuration");
        ApiError::InternalServer(
            "Unable to load form configuration. Please try again later.".to_string(),
        )
    })
}

/// GET /api/form-config
pub async fn form_config(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<Json<FormConfigResponse>, ApiError> {
    let sections = load_sections(&state_lock).await?;
    let metadata = FormConfigMetadata {
        total_fields: sections.field_count(),
        total_sections: sections.len(),
        timestamp: Utc::now().to_rfc3339(),
    };

    info!(
        fields = metadata.total_fields,
        sections = metadata.total_sections,
        "Served form configuration"
    );
    Ok(Json(FormConfigResponse {
        success: true,
        sections,
        metadata,
    }))
}

/// GET /api/public/form-config
/// The bare section map
pub async fn public_form_config(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<Json<OrderedSections>, ApiError> {
    Ok(Json(load_sections(&state_lock).await?))
}
