#![allow(dead_code)]

//! Test infrastructure for api integration tests

pub mod stub;

use api_lib::adapters::DbAdapter;
use api_lib::config::Config;
use api_lib::web::{build_router, AppState};
use savings_core::ports::DatabaseService;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Create an adapter over a migrated in-memory SQLite database.
///
/// One connection only: every new in-memory connection is a fresh database.
pub async fn create_test_db() -> DbAdapter {
    let db = DbAdapter::connect("sqlite::memory:", 1)
        .await
        .expect("Failed to create test database");
    db.run_migrations().await.expect("Failed to run migrations");
    db
}

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("sqlite::memory:".to_string()),
        "COOKIE_SECURE" => Some("false".to_string()),
        _ => None,
    })
    .expect("Failed to build test config")
}

pub async fn create_test_app() -> Router {
    build_router(Arc::new(AppState {
        db: Arc::new(create_test_db().await),
        config: Arc::new(test_config()),
    }))
}

/// App over an arbitrary port implementation.
pub fn create_app_with(db: Arc<dyn DatabaseService>) -> Router {
    build_router(Arc::new(AppState {
        db,
        config: Arc::new(test_config()),
    }))
}

/// A response with its body read as JSON (`Value::Null` when empty).
pub struct TestResponse {
    pub status: StatusCode,
    pub set_cookie: Option<String>,
    pub json: Value,
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    TestResponse {
        status,
        set_cookie,
        json,
    }
}

/// The `name=value` part of a `Set-Cookie` header, ready for a `Cookie` header.
pub fn cookie_pair(set_cookie: &str) -> String {
    set_cookie.split(';').next().unwrap().to_string()
}

/// Registers an account and returns its session cookie and user id.
pub async fn register(app: &Router, display_name: &str, email: &str) -> (String, String) {
    let response = send(
        app,
        "POST",
        "/auth/register",
        None,
        Some(json!({
            "display_name": display_name,
            "email": email,
            "password": "secret1",
            "confirm_password": "secret1",
        })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let cookie = cookie_pair(&response.set_cookie.expect("register sets a cookie"));
    let user_id = response.json["user_id"].as_str().unwrap().to_string();
    (cookie, user_id)
}

/// Creates a group as the cookie's owner and returns its id.
pub async fn create_group(app: &Router, cookie: &str, name: &str, target_amount: &str) -> String {
    let response = send(
        app,
        "POST",
        "/groups",
        Some(cookie),
        Some(json!({
            "name": name,
            "target_amount": target_amount,
            "target_date": "2099-12-31",
            "description": "Trip savings",
        })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);
    response.json["id"].as_str().unwrap().to_string()
}

pub async fn contribute(app: &Router, cookie: &str, group_id: &str, amount: &str) {
    let response = send(
        app,
        "POST",
        &format!("/groups/{}/contributions", group_id),
        Some(cookie),
        Some(json!({ "amount": amount })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);
}
