// src/main.rs
use axum::{
    extract::{DefaultBodyLimit, Extension},
    http::{header, HeaderValue, Method},
    middleware, Router,
};
use dotenv::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::PathBuf;
use std::{str::FromStr, sync::Arc};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod admin;
mod applications;
mod auth;
mod common;
mod forms;
mod logging_middleware;

use common::{AppConfig, AppState};

// ============================================================================
// ROUTER COMPOSITION
// ============================================================================

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let headers = [header::CONTENT_TYPE, header::AUTHORIZATION];

    if config.allows_any_origin() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(headers);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(true)
}

/// Full HTTP surface over shared state
pub fn build_router(shared: Arc<RwLock<AppState>>, config: &AppConfig) -> Router {
    Router::new()
        // ====================================================================
        // AUTHENTICATION ROUTES (Login, Logout, Current User)
        // ====================================================================
        .merge(auth::auth_routes())
        // ====================================================================
        // FORM CONFIGURATION ROUTES (Public Form, Fields, Sections)
        // ====================================================================
        .merge(forms::forms_routes())
        // ====================================================================
        // APPLICATION ROUTES (Submission, Resumes, Records)
        // ====================================================================
        .merge(applications::applications_routes())
        // ====================================================================
        // ADMIN ROUTES (Dashboard, Exports, Statuses, Users, Health)
        // ====================================================================
        .merge(admin::admin_routes())
        // ====================================================================
        // MIDDLEWARE AND LAYERS
        // ====================================================================
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(middleware::from_fn(logging_middleware::log_request_response))
        .layer(Extension(shared))
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
}

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let config = AppConfig::from_env();
    config.warn_insecure_defaults();
    info!(
        upload_dir = %config.upload_dir.display(),
        allowed_extensions = %config.allowed_extensions_display(),
        max_upload_bytes = config.max_upload_bytes,
        "Configuration loaded"
    );

    // ========================================================================
    // DIRECTORY SETUP
    // ========================================================================

    tokio::fs::create_dir_all(&config.upload_dir).await?;

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    if let Some(path_part) = config.database_url.strip_prefix("sqlite://") {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options =
        SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    // Run database migrations
    common::migrations::run_migrations(&pool, &config).await?;

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let bind_addr = format!("{}:{}", config.host, config.port);
    let app_state = AppState::new(pool, config);
    let app = {
        let config = app_state.config.clone();
        build_router(Arc::new(RwLock::new(app_state)), &config)
    };

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let listener = TcpListener::bind(bind_addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_support::migrated_state;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn preflight(cors_origins: Vec<String>, origin: &str) -> Option<String> {
        let (state, _dir) = migrated_state().await;
        let mut config = (*state.read().await.config).clone();
        config.cors_origins = cors_origins;
        let response = build_router(state, &config)
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/form-config")
                    .header(header::ORIGIN, origin)
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_cors_any_origin_when_unset() {
        assert_eq!(preflight(vec![], "http://a.test").await.as_deref(), Some("*"));
        assert_eq!(
            preflight(vec!["*".to_string()], "http://a.test").await.as_deref(),
            Some("*")
        );
    }

    #[tokio::test]
    async fn test_cors_listed_origins_only() {
        let origins = vec!["http://dash.test".to_string()];
        assert_eq!(
            preflight(origins.clone(), "http://dash.test").await.as_deref(),
            Some("http://dash.test")
        );
        assert_eq!(preflight(origins, "http://evil.test").await, None);
    }
}
