// Shared fixtures for in-crate tests

use axum::{body::to_bytes, response::Response, Router};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::RwLock;

use super::{migrations::run_migrations, AppConfig, AppState};

/// Single-connection in-memory database; every pooled connection to
/// `sqlite::memory:` would otherwise see its own empty database.
pub async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite pool")
}

/// Fully migrated state with a temporary upload directory.
/// Keep the `TempDir` alive for the duration of the test.
pub async fn migrated_state() -> (Arc<RwLock<AppState>>, TempDir) {
    let upload_dir = tempfile::tempdir().expect("temp upload dir");
    let config = AppConfig::for_tests(upload_dir.path().to_path_buf());
    let pool = memory_pool().await;
    run_migrations(&pool, &config).await.expect("migrations run");
    let state = AppState::new(pool, config);
    (Arc::new(RwLock::new(state)), upload_dir)
}

/// Router over a migrated state
pub async fn test_app() -> (Router, Arc<RwLock<AppState>>, TempDir) {
    let (state, dir) = migrated_state().await;
    let config = state.read().await.config.clone();
    let router = crate::build_router(state.clone(), &config);
    (router, state, dir)
}

pub async fn read_json(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body");
    serde_json::from_slice(&bytes).expect("json body")
}

pub async fn read_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body");
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

/// Logs in through the real router and returns the session token
pub async fn login_token(router: &Router, email: &str, password: &str) -> String {
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    let body = serde_json::json!({ "email": email, "password": password }).to_string();
    let response = router
        .clone()
        .oneshot(
            Request::post("/api/auth/login")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .expect("login request"),
        )
        .await
        .expect("login response");
    assert_eq!(response.status(), axum::http::StatusCode::OK, "login failed");
    read_json(response).await["token"]
        .as_str()
        .expect("token in login response")
        .to_string()
}

pub async fn admin_token(router: &Router) -> String {
    login_token(router, "admin@example.com", "admin-pass").await
}

/// Inserts a viewer account directly
pub async fn create_viewer(state: &Arc<RwLock<AppState>>, email: &str, password: &str) -> i64 {
    let hash = crate::auth::password::hash_password(password).expect("hash");
    let db = state.read().await.db.clone();
    sqlx::query("INSERT INTO users (email, password_hash, role) VALUES (?, ?, 'viewer')")
        .bind(email)
        .bind(hash)
        .execute(&db)
        .await
        .expect("insert viewer")
        .last_insert_rowid()
}

/// JSON request with an optional bearer token
pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> axum::http::Request<axum::body::Body> {
    let mut builder = axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder
        .body(axum::body::Body::from(body.to_string()))
        .expect("json request")
}

pub fn get_request(uri: &str, token: Option<&str>) -> axum::http::Request<axum::body::Body> {
    let mut builder = axum::http::Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder
        .body(axum::body::Body::empty())
        .expect("get request")
}

pub const TEST_BOUNDARY: &str = "----recruitment-test-boundary";

/// Hand-built multipart/form-data request; `file` is sent as the resume part
pub fn multipart_request(
    uri: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &[u8])>,
) -> axum::http::Request<axum::body::Body> {
    let mut body: Vec<u8> = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                TEST_BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, data)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                TEST_BOUNDARY,
                crate::applications::models::RESUME_PART,
                file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", TEST_BOUNDARY).as_bytes());

    axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", TEST_BOUNDARY),
        )
        .body(axum::body::Body::from(body))
        .expect("multipart request")
}

/// Minimal bytes carrying the PDF signature
pub const PDF_BYTES: &[u8] = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\ntrailer\n%%EOF\n";

/// Every required default field with a valid value
pub fn valid_application(name: &'static str, email: &'static str) -> Vec<(&'static str, &'static str)> {
    vec![
        ("name", name),
        ("email", email),
        ("dob", "1990-05-01"),
        ("mobile_number", "+91 9876543210"),
        ("present_address", "12 Park Street, Kolkata"),
    ]
}
