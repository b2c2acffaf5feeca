// src/logging_middleware.rs
//! Middleware for logging request and response bodies in debug mode

use axum::body::to_bytes;
use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use serde_json::Value;
use tracing::{debug, enabled, Level};

const REDACTED: &str = "[redacted]";
const SECRET_KEYS: [&str; 2] = ["password", "token"];

fn content_type(headers: &HeaderMap) -> &str {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// Text bodies worth logging; uploads and downloads are skipped
fn is_loggable(content_type: &str) -> bool {
    content_type.is_empty()
        || content_type.starts_with("application/json")
        || content_type.starts_with("application/x-www-form-urlencoded")
}

fn redact_json(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, item) in map.iter_mut() {
                if SECRET_KEYS.contains(&key.as_str()) {
                    *item = Value::String(REDACTED.to_string());
                } else {
                    redact_json(item);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact_json),
        _ => {}
    }
}

fn redact_form(body: &str) -> String {
    body.split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if SECRET_KEYS.contains(&key) => format!("{}={}", key, REDACTED),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Printable body with credentials masked
pub fn render_body(bytes: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(bytes).ok()?;
    if let Ok(mut json) = serde_json::from_str::<Value>(text) {
        redact_json(&mut json);
        return Some(serde_json::to_string_pretty(&json).unwrap_or_else(|_| text.to_string()));
    }
    Some(redact_form(text))
}

/// Middleware to log request and response bodies in debug mode
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    if !enabled!(Level::DEBUG) {
        return Ok(next.run(request).await);
    }

    let request = if is_loggable(content_type(request.headers())) {
        let (parts, body) = request.into_parts();
        let bytes = to_bytes(body, usize::MAX)
            .await
            .map_err(|_| StatusCode::BAD_REQUEST)?;

        if let Some(body_str) = render_body(&bytes).filter(|b| !b.is_empty()) {
            debug!(
                method = %parts.method,
                uri = %parts.uri,
                request_body = %body_str,
                "Request"
            );
        }
        Request::from_parts(parts, Body::from(bytes))
    } else {
        debug!(
            method = %request.method(),
            uri = %request.uri(),
            content_type = %content_type(request.headers()),
            "Request (body not logged)"
        );
        request
    };

    let response = next.run(request).await;
    if !is_loggable(content_type(response.headers())) {
        return Ok(response);
    }

    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if let Some(body_str) = render_body(&bytes).filter(|b| !b.is_empty()) {
        debug!(
            status = %parts.status,
            response_body = %body_str,
            "Response"
        );
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}
