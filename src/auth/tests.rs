//! Tests for auth module
//!
//! These tests verify:
//! - Session token signing and validation
//! - Token lookup from headers and cookies
//! - Login, logout and /api/me through the router

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::common::test_support::{
        admin_token, create_viewer, login_token, read_json, test_app,
    };
    use axum::{
        body::Body,
        http::{header, HeaderMap, HeaderValue, Request, StatusCode},
    };
    use tower::ServiceExt;

    fn sample_user(role: Role) -> models::User {
        models::User {
            id: 7,
            email: "reviewer@example.com".to_string(),
            password_hash: String::new(),
            role,
        }
    }

    #[test]
    fn test_token_round_trip() {
        let token = session::issue_token(&sample_user(Role::Viewer), "secret", 1).unwrap();
        let claims = session::validate_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.role, Role::Viewer);
    }

    #[test]
    fn test_token_rejected_with_wrong_secret() {
        let token = session::issue_token(&sample_user(Role::Admin), "secret", 1).unwrap();
        assert!(session::validate_token(&token, "other").is_err());
    }

    #[test]
    fn test_token_from_bearer_and_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(session::token_from_headers(&headers), Some("abc".to_string()));

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; rt_session=xyz; other=1"),
        );
        assert_eq!(session::token_from_headers(&headers), Some("xyz".to_string()));

        assert_eq!(session::token_from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("viewer"), Some(Role::Viewer));
        assert_eq!(Role::parse("root"), None);
        assert_eq!(Role::Viewer.to_string(), "viewer");
    }

    #[tokio::test]
    async fn test_login_sets_cookie_and_returns_user() {
        let (app, _state, _dir) = test_app().await;
        let response = app
            .oneshot(
                Request::post("/api/auth/login")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"email": "Admin@Example.com", "password": "admin-pass"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("rt_session="));
        assert!(cookie.contains("HttpOnly"));

        let body = read_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["user"]["role"], "admin");
        assert!(body["token"].as_str().unwrap().len() > 20);
    }

    #[tokio::test]
    async fn test_login_accepts_form_body() {
        let (app, _state, _dir) = test_app().await;
        let response = app
            .oneshot(
                Request::post("/api/auth/login")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("email=admin%40example.com&password=admin-pass"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let (app, _state, _dir) = test_app().await;
        let response = app
            .oneshot(
                Request::post("/api/auth/login")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"email": "admin@example.com", "password": "nope"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = read_json(response).await;
        assert_eq!(body["error"], "Invalid email or password.");
    }

    #[tokio::test]
    async fn test_login_with_dashboard_written_hash() {
        let (app, state, _dir) = test_app().await;
        let db = state.read().await.db.clone();
        sqlx::query("INSERT INTO users (email, password_hash, role) VALUES (?, ?, 'admin')")
            .bind("legacy@example.com")
            .bind(
                "pbkdf2:sha256:1000$abcdefgh12345678$\
                 79c27787522c6df2f56d2c2ead675b05776673f19664ffea51a760e099244e43",
            )
            .execute(&db)
            .await
            .unwrap();

        let token = login_token(&app, "legacy@example.com", "12345").await;
        let response = app
            .oneshot(
                Request::get("/api/me")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["user"]["email"], "legacy@example.com");
        assert_eq!(body["is_admin"], true);
    }

    #[tokio::test]
    async fn test_login_missing_fields() {
        let (app, _state, _dir) = test_app().await;
        let response = app
            .oneshot(
                Request::post("/api/auth/login")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"email": "admin@example.com"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_me_requires_session() {
        let (app, _state, _dir) = test_app().await;
        let response = app
            .oneshot(Request::get("/api/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_me_with_bearer_and_cookie() {
        let (app, _state, _dir) = test_app().await;
        let token = admin_token(&app).await;

        let response = app
            .clone()
            .oneshot(
                Request::get("/api/me")
                    .header("authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["is_admin"], true);
        assert_eq!(body["user"]["email"], "admin@example.com");

        let response = app
            .oneshot(
                Request::get("/api/me")
                    .header("cookie", format!("rt_session={}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_deleted_user_loses_access() {
        let (app, state, _dir) = test_app().await;
        let viewer_id = create_viewer(&state, "viewer@example.com", "viewer-pass").await;
        let token = login_token(&app, "viewer@example.com", "viewer-pass").await;

        let db = state.read().await.db.clone();
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(viewer_id)
            .execute(&db)
            .await
            .unwrap();

        let response = app
            .oneshot(
                Request::get("/api/me")
                    .header("authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_clears_cookie() {
        let (app, _state, _dir) = test_app().await;
        let response = app
            .oneshot(Request::get("/logout").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers().get(header::SET_COOKIE).unwrap();
        assert!(cookie.to_str().unwrap().contains("Max-Age=0"));
    }

    #[test]
    fn test_require_admin() {
        let viewer = AuthedUser {
            id: 2,
            email: "viewer@example.com".to_string(),
            role: Role::Viewer,
            is_admin: false,
        };
        assert!(viewer.require_admin().is_err());

        let admin = AuthedUser {
            id: 1,
            email: "admin@example.com".to_string(),
            role: Role::Admin,
            is_admin: true,
        };
        assert!(admin.require_admin().is_ok());
    }
}
