//! Authentication handlers

use axum::{
    extract::{Extension, FromRequest, Json, Request},
    http::header::{CONTENT_TYPE, SET_COOKIE},
    response::{IntoResponse, Response},
    Form,
};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::extractors::AuthedUser;
use super::models::{LoginRequest, User, UserSummary};
use super::password::verify_password;
use super::session::{clear_session_cookie, issue_token, session_cookie};
use crate::common::{safe_email_log, ApiError, AppState};

const INVALID_CREDENTIALS: &str = "Invalid email or password.";

/// POST /api/auth/login
/// Verifies email and password and starts a session
///
/// # Request Body
/// JSON or `application/x-www-form-urlencoded`:
/// ```json
/// { "email": "admin@example.com", "password": "..." }
/// ```
///
/// # Response
/// Sets the `rt_session` cookie and returns
/// ```json
/// { "success": true, "token": "<session token>", "user": { "id": 1, "email": "...", "role": "admin" } }
/// ```
pub async fn login_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    request: Request,
) -> Result<Response, ApiError> {
    let payload = read_login_payload(request).await?;
    let state = state_lock.read().await.clone();

    let email = payload
        .email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .unwrap_or_default();
    let password = payload.password.unwrap_or_default();

    if email.is_empty() || password.is_empty() {
        warn!("Login rejected: missing email or password");
        return Err(ApiError::BadRequest(
            "Email and password are required.".to_string(),
        ));
    }

    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, role FROM users WHERE email = ?",
    )
    .bind(&email)
    .fetch_optional(&state.db)
    .await?;

    let user = match user {
        Some(u) => u,
        None => {
            warn!(email = %safe_email_log(&email), "Login failed: unknown email");
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }
    };

    let verified = verify_password(&password, &user.password_hash).unwrap_or_else(|e| {
        error!(user_id = user.id, error = %e, "Stored password hash is unreadable");
        false
    });
    if !verified {
        warn!(email = %safe_email_log(&email), "Login failed: wrong password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let ttl_hours = state.config.session_ttl_hours;
    let token = issue_token(&user, &state.config.session_secret, ttl_hours)?;

    info!(
        user_id = user.id,
        email = %safe_email_log(&user.email),
        role = %user.role,
        "User logged in"
    );

    let body = json!({
        "success": true,
        "token": token,
        "user": UserSummary::from(&user),
    });
    Ok((
        [(SET_COOKIE, session_cookie(&token, ttl_hours))],
        Json(body),
    )
        .into_response())
}

async fn read_login_payload(request: Request) -> Result<LoginRequest, ApiError> {
    let is_form = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false);

    if is_form {
        let Form(payload) = Form::<LoginRequest>::from_request(request, &())
            .await
            .map_err(|e| {
                debug!(error = %e, "Unreadable login form");
                ApiError::BadRequest("Invalid login form".to_string())
            })?;
        Ok(payload)
    } else {
        let Json(payload) = Json::<LoginRequest>::from_request(request, &())
            .await
            .map_err(|e| {
                debug!(error = %e, "Unreadable login body");
                ApiError::BadRequest("Invalid login request".to_string())
            })?;
        Ok(payload)
    }
}

/// POST /api/auth/logout, GET /logout
/// Clears the session cookie; bearer tokens simply expire
pub async fn logout_handler() -> Response {
    info!("User logout");
    (
        [(SET_COOKIE, clear_session_cookie())],
        Json(json!({ "success": true, "message": "Logged out" })),
    )
        .into_response()
}

/// GET /api/me
pub async fn me_handler(authed: AuthedUser) -> Result<Json<serde_json::Value>, ApiError> {
    Ok(Json(json!({
        "success": true,
        "user": {
            "id": authed.id,
            "email": authed.email,
            "role": authed.role,
        },
        "is_admin": authed.is_admin,
    })))
}
