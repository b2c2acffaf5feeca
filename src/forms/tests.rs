//! Tests for the forms module
//!
//! Exercised through the router against a migrated in-memory database:
//! - Public form structure and section ordering
//! - Field create/update/delete with the backing column
//! - Section management

#[cfg(test)]
mod tests {
    use crate::common::test_support::{
        admin_token, create_viewer, get_request, json_request, login_token, multipart_request,
        read_json, read_text, test_app, valid_application, PDF_BYTES,
    };
    use crate::forms::schema::application_columns;
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    async fn field_id(state: &std::sync::Arc<tokio::sync::RwLock<crate::common::AppState>>, name: &str) -> i64 {
        let db = state.read().await.db.clone();
        sqlx::query_scalar("SELECT id FROM form_config WHERE name = ?")
            .bind(name)
            .fetch_one(&db)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_public_form_config_envelope() {
        let (app, _state, _dir) = test_app().await;
        let response = app
            .oneshot(get_request("/api/form-config", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let text = read_text(response).await;
        let personal = text.find("\"Personal Details\"").unwrap();
        let academic = text.find("\"Academic Qualifications\"").unwrap();
        let additional = text.find("\"Additional Information\"").unwrap();
        assert!(personal < academic && academic < additional);

        let body: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["metadata"]["total_fields"], 50);
        assert_eq!(body["metadata"]["total_sections"], 5);
        let name_field = &body["sections"]["Personal Details"][0];
        assert_eq!(name_field["name"], "name");
        assert_eq!(name_field["type"], "text");
        assert_eq!(name_field["required"], true);
        assert_eq!(name_field["is_core"], true);
    }

    #[tokio::test]
    async fn test_bare_public_map_follows_section_order() {
        let (app, _state, _dir) = test_app().await;
        let token = admin_token(&app).await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/form/sections/reorder",
                Some(&token),
                json!({"sections": ["Additional Information", "Personal Details"]}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(get_request("/api/public/form-config", None))
            .await
            .unwrap();
        let text = read_text(response).await;
        assert!(text.find("\"Additional Information\"").unwrap() < text.find("\"Personal Details\"").unwrap());
    }

    #[tokio::test]
    async fn test_admin_routes_require_admin() {
        let (app, state, _dir) = test_app().await;

        let response = app
            .clone()
            .oneshot(get_request("/api/form/config", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        create_viewer(&state, "viewer@example.com", "viewer-pass").await;
        let viewer = login_token(&app, "viewer@example.com", "viewer-pass").await;
        let response = app
            .oneshot(get_request("/api/form/config", Some(&viewer)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(read_json(response).await["error"], "Admin access required.");
    }

    #[tokio::test]
    async fn test_create_field_adds_column_and_section() {
        let (app, state, _dir) = test_app().await;
        let token = admin_token(&app).await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/form/config",
                Some(&token),
                json!({
                    "name": "Notice Period",
                    "label": "Notice Period (days)",
                    "type": "number",
                    "subsection": "Employment",
                    "required": true,
                    "validations": {"min": 0, "max": 180}
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["name"], "notice_period");

        let db = state.read().await.db.clone();
        let columns = application_columns(&db).await.unwrap();
        assert!(columns.contains(&"notice_period".to_string()));

        let (order, validations): (i64, String) = sqlx::query_as(
            "SELECT field_order, validations FROM form_config WHERE name = 'notice_period'",
        )
        .fetch_one(&db)
        .await
        .unwrap();
        assert_eq!(order, 50);
        assert!(validations.contains("180"));

        let section: Option<String> =
            sqlx::query_scalar("SELECT name FROM form_sections WHERE name = 'Employment'")
                .fetch_optional(&db)
                .await
                .unwrap();
        assert!(section.is_some());

        // same column again
        let response = app
            .oneshot(json_request(
                "POST",
                "/api/form/config",
                Some(&token),
                json!({"name": "notice_period", "label": "x", "type": "text", "subsection": "Employment"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_dashboard_rule_keys_apply_to_submissions() {
        let (app, _state, _dir) = test_app().await;
        let token = admin_token(&app).await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/form/config",
                Some(&token),
                json!({
                    "name": "referral_code",
                    "label": "Referral Code",
                    "type": "text",
                    "subsection": "Other Details",
                    "validations": {"minLength": 5, "errorMessage": "Referral codes have 5+ characters"}
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let mut fields = valid_application("Asha Rao", "asha@example.com");
        fields.push(("referral_code", "ab"));
        let response = app
            .clone()
            .oneshot(multipart_request(
                "/api/submit-application",
                &fields,
                Some(("cv.pdf", PDF_BYTES)),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(body["details"], json!(["Referral codes have 5+ characters"]));

        fields.pop();
        fields.push(("referral_code", "ABCDE"));
        let response = app
            .oneshot(multipart_request(
                "/api/submit-application",
                &fields,
                Some(("cv.pdf", PDF_BYTES)),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_field_rejects_unsafe_names() {
        let (app, state, _dir) = test_app().await;
        let token = admin_token(&app).await;

        for name in ["status", "x; DROP TABLE users", "1abc"] {
            let response = app
                .clone()
                .oneshot(json_request(
                    "POST",
                    "/api/form/config",
                    Some(&token),
                    json!({"name": name, "label": "x", "type": "text", "subsection": "S"}),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "name {}", name);
        }

        let db = state.read().await.db.clone();
        let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!(users, 1);
    }

    #[tokio::test]
    async fn test_update_field() {
        let (app, state, _dir) = test_app().await;
        let token = admin_token(&app).await;
        let id = field_id(&state, "hobbies").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/api/form/config/{}", id),
                Some(&token),
                json!({"label": "Interests", "required": 1}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let db = state.read().await.db.clone();
        let (label, required): (String, bool) =
            sqlx::query_as("SELECT label, required FROM form_config WHERE id = ?")
                .bind(id)
                .fetch_one(&db)
                .await
                .unwrap();
        assert_eq!(label, "Interests");
        assert!(required);

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/api/form/config/{}", id),
                Some(&token),
                json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(json_request(
                "PUT",
                "/api/form/config/99999",
                Some(&token),
                json!({"label": "x"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_field_drops_column_but_not_core() {
        let (app, state, _dir) = test_app().await;
        let token = admin_token(&app).await;

        let email_id = field_id(&state, "email").await;
        let response = app
            .clone()
            .oneshot(json_request(
                "DELETE",
                &format!("/api/form/config/{}", email_id),
                Some(&token),
                json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["error"], "Core fields cannot be deleted.");

        let hobbies_id = field_id(&state, "hobbies").await;
        let response = app
            .oneshot(json_request(
                "DELETE",
                &format!("/api/form/config/{}", hobbies_id),
                Some(&token),
                json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let db = state.read().await.db.clone();
        let columns = application_columns(&db).await.unwrap();
        assert!(!columns.contains(&"hobbies".to_string()));
        assert!(columns.contains(&"email".to_string()));
    }

    #[tokio::test]
    async fn test_reorder_and_bulk_update() {
        let (app, state, _dir) = test_app().await;
        let token = admin_token(&app).await;
        let dob = field_id(&state, "dob").await;
        let gender = field_id(&state, "gender").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/form/config/reorder",
                Some(&token),
                json!({"field_orders": [[dob, 90], [gender, 91]]}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/form/config/bulk-update",
                Some(&token),
                json!({"updates": [{"id": gender, "required": true, "field_order": 5}, {"required": true}]}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let db = state.read().await.db.clone();
        let dob_order: i64 = sqlx::query_scalar("SELECT field_order FROM form_config WHERE id = ?")
            .bind(dob)
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!(dob_order, 90);
        let (order, required): (i64, bool) =
            sqlx::query_as("SELECT field_order, required FROM form_config WHERE id = ?")
                .bind(gender)
                .fetch_one(&db)
                .await
                .unwrap();
        assert_eq!(order, 5);
        assert!(required);
    }

    #[tokio::test]
    async fn test_section_lifecycle() {
        let (app, state, _dir) = test_app().await;
        let token = admin_token(&app).await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/form/sections",
                Some(&token),
                json!({"name": "References", "description": "Who can vouch for you"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/form/sections",
                Some(&token),
                json!({"name": "References"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            read_json(response).await["error"],
            "Section with this name already exists."
        );

        let response = app
            .clone()
            .oneshot(get_request("/api/form/sections", Some(&token)))
            .await
            .unwrap();
        let sections = read_json(response).await;
        let last = sections.as_array().unwrap().last().unwrap().clone();
        assert_eq!(last["name"], "References");
        assert_eq!(last["order"], 6);
        assert_eq!(last["icon"], "folder");

        // non-empty sections stay
        let response = app
            .clone()
            .oneshot(json_request(
                "DELETE",
                "/api/form/sections/Spouse's%20Details",
                Some(&token),
                json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .clone()
            .oneshot(json_request(
                "DELETE",
                "/api/form/sections/References",
                Some(&token),
                json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // renaming moves the fields
        let response = app
            .oneshot(json_request(
                "PUT",
                "/api/form/sections/Spouse's%20Details",
                Some(&token),
                json!({"name": "Family", "icon": "people"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let db = state.read().await.db.clone();
        let moved: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM form_config WHERE subsection = 'Family'")
                .fetch_one(&db)
                .await
                .unwrap();
        assert_eq!(moved, 4);
        let icon: String = sqlx::query_scalar("SELECT icon FROM form_sections WHERE name = 'Family'")
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!(icon, "people");
    }

    #[tokio::test]
    async fn test_reorder_sections_requires_names() {
        let (app, _state, _dir) = test_app().await;
        let token = admin_token(&app).await;
        let response = app
            .oneshot(json_request(
                "POST",
                "/api/form/sections/reorder",
                Some(&token),
                json!({"sections": []}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
