//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::request::Parts,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use super::models::{Role, User};
use super::session::{token_from_headers, validate_token};
use crate::common::{safe_email_log, ApiError, AppState};

/// Authenticated user extractor
///
/// Accepts the session token as a Bearer header or the session cookie, then
/// reloads the user so deleted accounts and role changes apply immediately.
#[derive(Debug)]
pub struct AuthedUser {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub is_admin: bool,
}

impl AuthedUser {
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin {
            Ok(())
        } else {
            warn!(
                user_id = self.id,
                email = %safe_email_log(&self.email),
                "Non-admin user attempted an admin operation"
            );
            Err(ApiError::Forbidden("Admin access required.".to_string()))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(state_lock): Extension<Arc<RwLock<AppState>>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let app_state = state_lock.read().await.clone();

        let token = match token_from_headers(&parts.headers) {
            Some(t) => t,
            None => {
                warn!("Authentication failed: no session token");
                return Err(ApiError::Unauthorized("Authentication required.".into()));
            }
        };

        let claims = validate_token(&token, &app_state.config.session_secret)?;
        let user_id: i64 = claims.sub.parse().map_err(|_| {
            warn!(sub = %claims.sub, "Session token carries a malformed subject");
            ApiError::Unauthorized("invalid session".into())
        })?;

        let user: Option<User> = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, role FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&app_state.db)
        .await
        .map_err(|e| {
            error!(
                error = %e,
                user_id = user_id,
                "Database error during user lookup in authentication"
            );
            ApiError::DatabaseError(e)
        })?;

        match user {
            Some(u) => {
                debug!(
                    user_id = u.id,
                    email = %safe_email_log(&u.email),
                    role = %u.role,
                    "User authentication successful via extractor"
                );
                Ok(AuthedUser {
                    id: u.id,
                    is_admin: u.role == Role::Admin,
                    email: u.email,
                    role: u.role,
                })
            }
            None => {
                warn!(user_id = user_id, "Authentication failed: user no longer exists");
                Err(ApiError::Unauthorized("Authentication required.".into()))
            }
        }
    }
}
