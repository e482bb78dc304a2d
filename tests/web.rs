// tests/web.rs
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt; // for .oneshot()

use phishwatch::{
    app_state::AppState,
    config::AppConfig,
    web::{build_router, FORM_EXPIRED_MESSAGE},
};

fn test_state(dir: &Path) -> Arc<AppState> {
    let config = AppConfig {
        log_path: dir.join("checks.log"),
        secret_key: Some("test-secret".to_string()),
        ..AppConfig::default()
    };
    Arc::new(AppState::from_config(&config).expect("state"))
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn form_request(body: String) -> Request<Body> {
    Request::builder()
        .uri("/")
        .method("POST")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    (status, body_string(response).await)
}

#[tokio::test]
async fn index_renders_form_with_token() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_router(test_state(dir.path()));

    let (status, html) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(r#"name="csrf_token""#));
    assert!(html.contains(r#"value="dummy""#));
    assert!(html.contains(r#"value="google""#));
}

#[tokio::test]
async fn keyword_form_check_reports_phishing() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());
    let token = state.csrf.generate_token();
    let app = build_router(state);

    let body = format!("url=http%3A%2F%2Fexample.com%2Flogin&method=dummy&csrf_token={token}");
    let response = app.oneshot(form_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains("Phishing Detected!"));
    assert!(html.contains("Dummy Keyword Matching"));
    // Keyword checks are not logged by default.
    assert!(!dir.path().join("checks.log").exists());
}

#[tokio::test]
async fn keyword_form_check_reports_safe() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());
    let token = state.csrf.generate_token();
    let app = build_router(state);

    let body = format!("url=https%3A%2F%2Fexample.com%2F&method=dummy&csrf_token={token}");
    let html = body_string(app.oneshot(form_request(body)).await.unwrap()).await;
    assert!(html.contains("Safe URL"));
}

#[tokio::test]
async fn blank_url_is_input_validation() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());
    let token = state.csrf.generate_token();
    let app = build_router(state);

    let body = format!("url=+++&method=google&csrf_token={token}");
    let html = body_string(app.oneshot(form_request(body)).await.unwrap()).await;
    assert!(html.contains("Please enter a valid URL."));
    assert!(html.contains("Input Validation"));
    assert!(!dir.path().join("checks.log").exists());
}

#[tokio::test]
async fn unknown_method_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());
    let token = state.csrf.generate_token();
    let app = build_router(state);

    let body = format!("url=http%3A%2F%2Fexample.com&method=bing&csrf_token={token}");
    let html = body_string(app.oneshot(form_request(body)).await.unwrap()).await;
    assert!(html.contains("Unknown detection method selected."));
}

#[tokio::test]
async fn remote_form_check_without_key_shows_api_error() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());
    let token = state.csrf.generate_token();
    let app = build_router(state);

    let body = format!("url=http%3A%2F%2Fexample.com%2Fa%3Fb%3Dc&method=google&csrf_token={token}");
    let html = body_string(app.clone().oneshot(form_request(body)).await.unwrap()).await;
    assert!(html.contains("API error:"));
    assert!(html.contains("Google Safe Browsing API"));

    let (_, dashboard) = get(&app, "/dashboard").await;
    assert!(dashboard.contains("http://example.com"));
    assert!(!dashboard.contains("b=c"));
}

#[tokio::test]
async fn missing_or_forged_token_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_router(test_state(dir.path()));

    let html = body_string(
        app.clone()
            .oneshot(form_request("url=http%3A%2F%2Fexample.com&method=dummy".to_string()))
            .await
            .unwrap(),
    )
    .await;
    assert!(html.contains(FORM_EXPIRED_MESSAGE));

    let html = body_string(
        app.oneshot(form_request(
            "url=http%3A%2F%2Fexample.com&method=dummy&csrf_token=1.abc.def".to_string(),
        ))
        .await
        .unwrap(),
    )
    .await;
    assert!(!html.contains("Safe URL"));
}

#[tokio::test]
async fn dashboard_without_log_shows_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_router(test_state(dir.path()));

    let (status, html) = get(&app, "/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Log file not found."));
}

#[tokio::test]
async fn dashboard_lists_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("checks.log"),
        "2026-01-01T00:00:00.000Z,INFO,http://first.example,200,0.100,Safe\n\
         2026-01-01T00:00:01.000Z,INFO,http://second.example,200,0.100,Phishing\n",
    )
    .unwrap();
    let app = build_router(test_state(dir.path()));

    let (_, html) = get(&app, "/dashboard").await;
    let first = html.find("http://first.example").unwrap();
    let second = html.find("http://second.example").unwrap();
    assert!(second < first);
}

#[tokio::test]
async fn api_check_returns_verdict() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_router(test_state(dir.path()));

    let req = json_request(
        "/api/check",
        json!({ "url": "https://secure-banking.example/x?y=z", "method": "dummy" }),
    );
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["verdict"], "threat");
    assert_eq!(body["label"], "Phishing");
    assert_eq!(body["method"], "keyword");
    assert_eq!(body["sanitized_url"], "https://secure-banking.example");
}

#[tokio::test]
async fn api_check_maps_errors_to_status_codes() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_router(test_state(dir.path()));

    let blank = app
        .clone()
        .oneshot(json_request("/api/check", json!({ "url": "", "method": "dummy" })))
        .await
        .unwrap();
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body_string(blank).await).unwrap();
    assert!(body.get("error").is_some());

    let unknown = app
        .clone()
        .oneshot(json_request("/api/check", json!({ "url": "http://a.example", "method": "x" })))
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);

    let no_key = app
        .oneshot(json_request("/api/check", json!({ "url": "http://a.example", "method": "google" })))
        .await
        .unwrap();
    assert_eq!(no_key.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn api_logs_respects_limit() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("checks.log"),
        "a,INFO,http://a,200,0.1,Safe\nb,INFO,http://b,200,0.1,Safe\nc,ERROR,http://c,ERROR,boom, again\n",
    )
    .unwrap();
    let app = build_router(test_state(dir.path()));

    let (status, body) = get(&app, "/api/logs?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    let records: Vec<Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["timestamp"], "c");
    assert_eq!(records[0]["result"], "boom, again");
    assert_eq!(records[1]["timestamp"], "b");
}

#[tokio::test]
async fn health_and_unknown_routes() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_router(test_state(dir.path()));

    let (status, body) = get(&app, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("ok"));

    let (status, _) = get(&app, "/about").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(&app, "/no/such/page").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("error"));
}
