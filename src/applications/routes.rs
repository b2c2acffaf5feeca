// src/applications/routes.rs

use crate::applications::handlers::{self, files};
use axum::{
    routing::{get, post},
    Router,
};

pub fn applications_routes() -> Router {
    Router::new()
        // Public intake
        .route("/api/submit-application", post(handlers::submit_application))
        .route("/api/submit_application", post(handlers::submit_application))
        // Reviewer access
        .route("/uploads/:filename", get(files::serve_resume))
        .route(
            "/api/applications/:id",
            get(handlers::get_application).delete(handlers::delete_application),
        )
}
