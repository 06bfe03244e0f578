//! Shared test helpers: in-memory app setup, users, and request plumbing

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use sqlx::SqlitePool;
use tower::util::ServiceExt; // for `oneshot`

use surgilog_common::models::Role;
use surgilog_web::{build_router, AppState};

/// Build the app over a fresh in-memory database
pub async fn setup_app() -> (Router, SqlitePool) {
    let pool = surgilog_common::db::connect_in_memory()
        .await
        .expect("init in-memory db");
    let state = AppState::new(pool.clone());
    (build_router(state), pool)
}

/// Create a user directly in the database and log in through the API,
/// returning the session token
pub async fn create_login(
    app: &Router,
    pool: &SqlitePool,
    username: &str,
    role: Role,
    profile_guid: Option<&str>,
) -> String {
    surgilog_web::db::users::create_user(pool, username, "pw", role, profile_guid)
        .await
        .expect("create user");

    let (status, body) = send(
        app,
        "POST",
        "/api/login",
        None,
        Some(serde_json::json!({ "username": username, "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);

    body["token"].as_str().expect("token").to_string()
}

/// Build a request with optional bearer token and JSON body
pub fn request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Fire a request through the router and return status plus parsed JSON body
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request(method, uri, token, body))
        .await
        .expect("request failed");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("parse JSON")
    };

    (status, value)
}
