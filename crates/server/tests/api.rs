use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use crudcheck_server::{router, AppState};

fn app() -> (TempDir, Router) {
    let dir = tempfile::tempdir().expect("create temp dir");
    std::fs::write(
        dir.path().join("index.html"),
        "<!DOCTYPE html><html lang=\"en\"><body></body></html>",
    )
    .expect("write index.html");
    let app = router(Arc::new(AppState::default()), dir.path());
    (dir, app)
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

#[tokio::test]
async fn health_reports_success_with_timestamp() {
    let (_dir, app) = app();
    let (status, body) = call(&app, Method::GET, "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Server is running");
    let timestamp = body["timestamp"].as_str().expect("timestamp string");
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[tokio::test]
async fn items_crud_round_trip() {
    let (_dir, app) = app();

    let (status, body) = call(&app, Method::GET, "/api/items", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "count": 0, "data": []}));

    let (status, created) = call(
        &app,
        Method::POST,
        "/api/items",
        Some(json!({"name": "Test Item", "description": "first"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["success"], true);
    assert_eq!(created["data"]["name"], "Test Item");
    assert!(created["data"]["createdAt"].is_string());
    let id = created["data"]["id"].as_str().expect("id").to_string();

    let (status, body) = call(&app, Method::GET, "/api/items", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["id"], id.as_str());

    let (status, updated) = call(
        &app,
        Method::PUT,
        &format!("/api/items/{}", id),
        Some(json!({"name": "Renamed"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["name"], "Renamed");
    assert_eq!(updated["data"]["description"], "first");
    assert!(updated["data"]["updatedAt"].is_string());

    let (status, _) = call(&app, Method::DELETE, &format!("/api/items/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = call(&app, Method::GET, &format!("/api/items/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn create_rejects_empty_missing_and_malformed() {
    let (_dir, app) = app();

    for payload in [json!({"name": ""}), json!({"name": "   "}), json!({})] {
        let (status, body) = call(&app, Method::POST, "/api/items", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
    }

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/items")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_paths_get_json_404() {
    let (_dir, app) = app();

    for (method, uri) in [
        (Method::GET, "/api/nonexistent"),
        (Method::POST, "/api/nonexistent"),
        (Method::GET, "/missing.css"),
        (Method::DELETE, "/api/items"),
        (Method::POST, "/api/health"),
        (Method::PATCH, "/api/items/some-id"),
    ] {
        let (status, body) = call(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body, json!({"success": false, "error": "Endpoint not found"}));
    }
}

#[tokio::test]
async fn root_serves_index_document() {
    let (_dir, app) = app();

    let (status, body) = call(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_str().unwrap_or_default().starts_with("<!DOCTYPE html>"));
}

async fn send_form(app: &Router, method: Method, uri: &str, form: &'static str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn form_bodies_create_and_update() {
    let (_dir, app) = app();

    let (status, created) = send_form(&app, Method::POST, "/api/items", "name=Desk+Lamp&description=brass").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["name"], "Desk Lamp");
    assert_eq!(created["data"]["description"], "brass");
    let id = created["data"]["id"].as_str().expect("id").to_string();

    let (status, updated) = send_form(&app, Method::PUT, &format!("/api/items/{}", id), "name=Floor+Lamp").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["name"], "Floor Lamp");
    assert_eq!(updated["data"]["description"], "brass");

    let (status, body) = send_form(&app, Method::POST, "/api/items", "name=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn responses_carry_security_headers() {
    let (_dir, app) = app();

    for uri in ["/api/health", "/", "/api/nonexistent"] {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let headers = response.headers();

        let csp = headers
            .get(header::CONTENT_SECURITY_POLICY)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(csp.starts_with("default-src 'self';"), "{}: {}", uri, csp);
        assert!(csp.contains("style-src 'self' 'unsafe-inline'"), "{}", uri);
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff", "{}", uri);
        assert_eq!(headers[header::X_FRAME_OPTIONS], "SAMEORIGIN", "{}", uri);
    }
}
