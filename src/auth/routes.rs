//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /api/auth/login` - Email/password login, sets the session cookie
/// - `POST /api/auth/logout` - Clears the session cookie
/// - `GET /logout` - Same as above for plain links
/// - `GET /api/me` - Current user information
pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/auth/login", post(handlers::login_handler))
        .route("/api/auth/logout", post(handlers::logout_handler))
        .route("/logout", get(handlers::logout_handler))
        .route("/api/me", get(handlers::me_handler))
}
