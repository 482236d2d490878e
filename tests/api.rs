//! Router-level tests that need no running MongoDB.
//!
//! The store URI points at a closed port with millisecond timeouts, so
//! paths that do reach the store fail fast with 503 while everything that
//! must answer before the store (auth, validation, health) is exercised
//! for real.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use blog_server::{app, auth::PASSWORD_HEADER, config::Config, state::State};
use serde_json::{Value, json};
use tower::ServiceExt;

const ADMIN_PASSWORD: &str = "admin123";
const DEAD_STORE_URI: &str =
    "mongodb://127.0.0.1:9/?serverSelectionTimeoutMS=200&connectTimeoutMS=200";

fn test_app() -> Router {
    test_app_with_password(Some(ADMIN_PASSWORD))
}

fn test_app_with_password(admin_password: Option<&str>) -> Router {
    let state: Arc<State> = State::with_config(Config {
        port: 0,
        mongodb_uri: DEAD_STORE_URI.to_string(),
        mongodb_db: "blog_test".to_string(),
        admin_password: admin_password.map(str::to_string),
    });

    app(state)
}

async fn call(
    router: &Router,
    method: &str,
    uri: &str,
    password: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(password) = password {
        builder = builder.header(PASSWORD_HEADER, password);
    }
    if body.is_some() {
        builder = builder.header(CONTENT_TYPE, "application/json");
    }
    let body = match body {
        Some(value) => Body::from(serde_json::to_string(&value).unwrap()),
        None => Body::empty(),
    };
    let request = builder.body(body).unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let json = if bytes.is_empty() {
        json!(null)
    } else {
        serde_json::from_slice(&bytes).unwrap_or(json!(null))
    };

    (status, json)
}

fn valid_post() -> Value {
    json!({
        "title": "A",
        "content": "B",
        "imageUrl": "http://x/y.png",
        "excerpt": "C",
    })
}

// ── Health ──

#[tokio::test]
async fn health_is_ok_with_store_down() {
    let (status, body) = call(&test_app(), "GET", "/api/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["connected"], false);
}

// ── Auth ──

#[tokio::test]
async fn create_without_password_is_unauthorized() {
    let (status, body) = call(
        &test_app(),
        "POST",
        "/api/posts",
        None,
        Some(valid_post()),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized");
}

#[tokio::test]
async fn create_with_wrong_password_is_unauthorized() {
    let (status, body) = call(
        &test_app(),
        "POST",
        "/api/posts",
        Some("wrong"),
        Some(valid_post()),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized");
}

#[tokio::test]
async fn delete_with_wrong_password_is_unauthorized() {
    let (status, _) = call(
        &test_app(),
        "DELETE",
        "/api/posts/507f1f77bcf86cd799439011",
        Some("wrong"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unconfigured_secret_rejects_admin_routes() {
    let (status, _) = call(
        &test_app_with_password(None),
        "POST",
        "/api/posts",
        Some(ADMIN_PASSWORD),
        Some(valid_post()),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn listing_needs_no_password() {
    // Store is down, so the public route reports unavailability rather
    // than 401.
    let (status, _) = call(&test_app(), "GET", "/api/posts", None, None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

// ── Validation (answered before any connection attempt) ──

#[tokio::test]
async fn create_missing_field_is_bad_request() {
    let mut body = valid_post();
    body.as_object_mut().unwrap().remove("content");

    let (status, json) = call(
        &test_app(),
        "POST",
        "/api/posts",
        Some(ADMIN_PASSWORD),
        Some(body),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "content is required");
}

#[tokio::test]
async fn create_blank_title_is_bad_request() {
    let mut body = valid_post();
    body["title"] = json!("   ");

    let (status, _) = call(
        &test_app(),
        "POST",
        "/api/posts",
        Some(ADMIN_PASSWORD),
        Some(body),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_negative_counter_is_bad_request() {
    let mut body = valid_post();
    body["likes"] = json!(-5);

    let (status, json) = call(
        &test_app(),
        "POST",
        "/api/posts",
        Some(ADMIN_PASSWORD),
        Some(body),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "likes must not be negative");
}

#[tokio::test]
async fn update_blanking_required_field_is_bad_request() {
    let (status, _) = call(
        &test_app(),
        "PUT",
        "/api/posts/507f1f77bcf86cd799439011",
        Some(ADMIN_PASSWORD),
        Some(json!({ "excerpt": "" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Store unavailability ──

#[tokio::test]
async fn list_with_store_down_is_service_unavailable() {
    let (status, body) = call(&test_app(), "GET", "/api/posts", None, None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .starts_with("document store unavailable")
    );
}

#[tokio::test]
async fn create_with_store_down_is_service_unavailable() {
    let (status, _) = call(
        &test_app(),
        "POST",
        "/api/posts",
        Some(ADMIN_PASSWORD),
        Some(valid_post()),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn delete_with_store_down_is_service_unavailable() {
    // Auth passed, so the failure is the store's, not the gate's.
    let (status, _) = call(
        &test_app(),
        "DELETE",
        "/api/posts/507f1f77bcf86cd799439011",
        Some(ADMIN_PASSWORD),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
