mod common;

use common::TestApp;
use serde_json::Value;

#[tokio::test]
async fn health_check_returns_ok() {
    let app = TestApp::spawn().await;

    let response = app.get("/health").await;

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "AI Service");
    assert_eq!(body["version"], "1.0.0");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn readiness_follows_backend_health() {
    let app = TestApp::spawn().await;
    assert_eq!(app.get("/ready").await.status(), 200);

    let failing = TestApp::spawn_with_provider(std::sync::Arc::new(common::FailingProvider)).await;
    assert_eq!(failing.get("/ready").await.status(), 503);
}

#[tokio::test]
async fn unready_backend_renders_error_body() {
    let app = TestApp::spawn_with_provider(std::sync::Arc::new(common::FailingProvider)).await;

    let response = app.get("/ready").await;

    assert_eq!(response.status(), 503);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Service unavailable");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app.get("/api/ai/unknown").await;

    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("/api/ai/unknown"));
}

#[tokio::test]
async fn service_info_is_public() {
    let app = TestApp::spawn().await;

    let response = app.get("/api/info").await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["service"], "CEPEM AI Service");
    assert_eq!(body["status"], "running");
}

#[tokio::test]
async fn ai_info_lists_capabilities() {
    let app = TestApp::spawn().await;

    let response = app.get("/api/ai/info").await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["backend"], "stub");
    assert_eq!(body["model"], "gpt-3.5-turbo");
    let capabilities = body["capabilities"].as_array().unwrap();
    assert!(capabilities.contains(&Value::from("symptom_analysis")));
    assert!(capabilities.contains(&Value::from("diagnosis_assistance")));
}

#[tokio::test]
async fn request_id_is_echoed() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("{}/health", app.address))
        .header("x-request-id", "req-123")
        .send()
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn metrics_endpoint_exposes_pipeline_counters() {
    let app = TestApp::spawn().await;

    app.post_json(
        "/api/ai/analyze-symptoms",
        &serde_json::json!({ "symptoms": ["kašel"] }),
    )
    .await;

    let response = app.get("/metrics").await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("ai_requests_total"));
}
