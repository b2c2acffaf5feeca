// src/admin/routes.rs

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::handlers;

pub fn admin_routes() -> Router {
    Router::new()
        // Public service endpoints
        .route("/health", get(handlers::dashboard::health_check))
        .route(
            "/api/statistics",
            get(handlers::dashboard::get_statistics),
        )
        // Dashboard data and exports
        .route("/api/data", get(handlers::dashboard::get_dashboard_data))
        .route("/api/export", get(handlers::exports::export_applications))
        // Hiring status
        .route(
            "/api/update_status",
            post(handlers::statuses::update_status),
        )
        // Dashboard accounts
        .route(
            "/api/users",
            get(handlers::users::list_users).post(handlers::users::create_viewer),
        )
        .route(
            "/api/users/delete",
            post(handlers::users::delete_user_by_body),
        )
        .route("/api/users/:id", delete(handlers::users::delete_user))
}
