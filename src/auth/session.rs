//! Session tokens and the session cookie

use axum::http::{
    header::{AUTHORIZATION, COOKIE},
    HeaderMap,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::{error, warn};

use super::models::{SessionClaims, User};
use crate::common::ApiError;

pub const SESSION_COOKIE: &str = "rt_session";

/// Signs an HS256 session token for `user`, valid for `ttl_hours`
pub fn issue_token(user: &User, secret: &str, ttl_hours: i64) -> Result<String, ApiError> {
    let exp = (Utc::now() + Duration::hours(ttl_hours)).timestamp() as usize;
    let claims = SessionClaims {
        sub: user.id.to_string(),
        role: user.role,
        exp,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        error!(error = %e, user_id = user.id, "Failed to sign session token");
        ApiError::InternalServer("Failed to create session".to_string())
    })
}

pub fn validate_token(token: &str, secret: &str) -> Result<SessionClaims, ApiError> {
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        warn!(error = %e, "Session token validation failed");
        ApiError::Unauthorized("invalid session".into())
    })
}

/// Bearer token from `Authorization`, else the session cookie
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok()) {
        let bare = value.strip_prefix("Bearer ").unwrap_or(value).trim();
        if !bare.is_empty() {
            return Some(bare.to_string());
        }
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

pub fn session_cookie(token: &str, ttl_hours: i64) -> String {
    format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        ttl_hours * 3600
    )
}

pub fn clear_session_cookie() -> String {
    format!(
        "{}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0",
        SESSION_COOKIE
    )
}
