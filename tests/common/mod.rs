#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use contact_directory::app::{app, AppState};
use contact_directory::auth::Argon2Hasher;
use contact_directory::database::MemoryStore;

/// Router over a fresh in-memory store
pub fn test_app() -> Router {
    let state = AppState::new(Arc::new(MemoryStore::new()), Arc::new(Argon2Hasher::new()));
    app(state)
}

pub async fn request(
    app: &Router,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, token);
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&value)?)
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body)?).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, value))
}

/// Register and log in, returning the session token
pub async fn login_as(app: &Router, username: &str) -> Result<String> {
    let (status, _) = request(
        app,
        Method::POST,
        "/api/users",
        None,
        Some(json!({ "username": username, "password": "rahasia", "name": "Test User" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(
        app,
        Method::POST,
        "/api/users/login",
        None,
        Some(json!({ "username": username, "password": "rahasia" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(body["data"]["token"].as_str().unwrap_or_default().to_string())
}

pub async fn create_contact(app: &Router, token: &str, first_name: &str) -> Result<i64> {
    let (status, body) = request(
        app,
        Method::POST,
        "/api/contacts",
        Some(token),
        Some(json!({
            "first_name": first_name,
            "last_name": "Testington",
            "email": "test@example.com",
            "phone": "08999999"
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "create contact failed: {}", body);
    Ok(body["data"]["id"].as_i64().unwrap_or_default())
}
