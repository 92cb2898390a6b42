//! Smoke tests for the admin flow on the database backend.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use laptopstore::config::{Config, StorageBackend};
use serde_json::{Value, json};
use tower::ServiceExt;

const PNG: &str = "data:image/png;base64,iVBORw0KGgo=";

async fn spawn_app() -> (Router, tempfile::TempDir) {
    let images = tempfile::tempdir().unwrap();

    let mut config = Config::default();
    config.storage.backend = StorageBackend::Database;
    config.storage.database_url = "sqlite::memory:".to_string();
    config.storage.max_db_connections = 1;
    config.storage.min_db_connections = 1;
    config.images.local_path = images.path().display().to_string();
    config.server.secure_cookies = false;
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;

    let state = laptopstore::api::create_app_state_from_config(config, None)
        .await
        .expect("failed to create app state");

    (laptopstore::api::router(state), images)
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Option<String>, Value) {
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
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (
        status,
        cookie,
        serde_json::from_slice(&bytes).unwrap_or(Value::Null),
    )
}

#[tokio::test]
async fn test_database_backend_admin_flow() {
    let (app, images) = spawn_app().await;

    let (status, cookie, _) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "admin", "password": "admin123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let cookie = cookie.expect("session cookie");

    let (status, _, body) = request(
        &app,
        "POST",
        "/api/admin/products",
        Some(&cookie),
        Some(json!({
            "name": "Surface Laptop 5",
            "brand": "Microsoft",
            "price": 1099.99,
            "condition": "Refurbished",
            "images": [PNG, "https://cdn.example.com/side.png"],
            "specs": { "processor": "Intel Core i5-1235U", "ram": "8GB" },
            "featured": true
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap().to_string();
    let uploaded = body["data"]["images"][0].as_str().unwrap().to_string();
    let uploaded_file = images.path().join(uploaded.trim_start_matches("/images/"));
    assert!(uploaded_file.exists());

    let (status, _, body) = request(&app, "GET", "/api/products?brand=micro", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["products"][0]["id"], id.as_str());
    assert_eq!(
        body["data"]["products"][0]["specs"]["processor"],
        "Intel Core i5-1235U"
    );

    let (status, _, body) = request(&app, "GET", "/api/products/featured", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _, _) = request(
        &app,
        "PUT",
        "/api/admin/credentials",
        Some(&cookie),
        Some(json!({
            "current_password": "admin123",
            "new_username": "shopkeeper",
            "new_password": "long-enough-pw"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "admin", "password": "admin123" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = request(
        &app,
        "DELETE",
        &format!("/api/admin/products/{id}"),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!uploaded_file.exists());

    let (_, _, body) = request(&app, "GET", "/api/products", None, None).await;
    assert!(body["data"]["products"].as_array().unwrap().is_empty());
}
