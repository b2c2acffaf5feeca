// src/forms/routes.rs

use crate::forms::handlers;
use axum::{
    routing::{get, post, put},
    Router,
};

pub fn forms_routes() -> Router {
    Router::new()
        // Public form structure
        .route("/api/form-config", get(handlers::form_config))
        .route("/api/public/form-config", get(handlers::public_form_config))
        // Field configuration (admin)
        .route(
            "/api/form/config",
            get(handlers::list_fields).post(handlers::create_field),
        )
        .route("/api/form/config/reorder", post(handlers::reorder_fields))
        .route(
            "/api/form/config/bulk-update",
            post(handlers::bulk_update_fields),
        )
        .route(
            "/api/form/config/:id",
            put(handlers::update_field).delete(handlers::delete_field),
        )
        // Sections (admin)
        .route(
            "/api/form/sections",
            get(handlers::list_sections).post(handlers::create_section),
        )
        .route("/api/form/sections/reorder", post(handlers::reorder_sections))
        .route(
            "/api/form/sections/:name",
            put(handlers::update_section).delete(handlers::delete_section),
        )
}
