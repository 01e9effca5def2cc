//! REST API tests driven through the router with `tower::ServiceExt`.

#![allow(clippy::panic)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use push_dispatch::api::build_router;
use push_dispatch::app_state::AppState;
use push_dispatch::domain::{Event, QueuePolicy};
use push_dispatch::engine::DispatchEngine;
use push_dispatch::transport::{InMemoryTransport, PushTransport};

struct TestApp {
    router: Router,
    engine: Arc<DispatchEngine>,
    transport: Arc<InMemoryTransport>,
}

fn test_app() -> TestApp {
    let transport = Arc::new(InMemoryTransport::new());
    let events: HashMap<String, Event> =
        HashMap::from([("notify".to_string(), Event::new("notify", 8))]);
    let engine = Arc::new(DispatchEngine::with_transport(
        Arc::clone(&transport) as Arc<dyn PushTransport>,
        events,
        QueuePolicy::Block,
    ));
    let state = AppState::new(Arc::clone(&engine), Some(Duration::from_secs(5)));
    TestApp {
        router: build_router().with_state(state),
        engine,
        transport,
    }
}

async fn call(app: &TestApp, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    };
    let Ok(request) = request else {
        panic!("request should build");
    };
    let Ok(response) = app.router.clone().oneshot(request).await else {
        panic!("router is infallible");
    };
    let status = response.status();
    let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
        panic!("body should be readable");
    };
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn error_code(body: &Value) -> Option<u64> {
    body.get("error")
        .and_then(|e| e.get("code"))
        .and_then(Value::as_u64)
}

fn error_details(body: &Value) -> Option<&str> {
    body.get("error")
        .and_then(|e| e.get("details"))
        .and_then(Value::as_str)
}

async fn register(app: &TestApp, client_id: &str) {
    let (status, _) = call(
        app,
        Method::POST,
        "/api/v1/clients",
        Some(json!({ "client_id": client_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn health_reflects_engine_state() {
    let app = test_app();
    let (status, body) = call(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body.get("state").and_then(Value::as_str), Some("constructed"));

    assert!(app.engine.run().is_ok());
    let (status, body) = call(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("status").and_then(Value::as_str), Some("healthy"));
    assert_eq!(body.get("events").and_then(Value::as_u64), Some(1));
}

#[tokio::test]
async fn client_lifecycle() {
    let app = test_app();

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/clients",
        Some(json!({ "client_id": "c1", "channel": "private-c1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body.get("channel").and_then(Value::as_str), Some("private-c1"));

    let (status, body) = call(&app, Method::GET, "/api/v1/clients/c1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("client_id").and_then(Value::as_str), Some("c1"));

    let (status, body) = call(&app, Method::GET, "/api/v1/clients", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("total").and_then(Value::as_u64), Some(1));

    let (status, _) = call(&app, Method::DELETE, "/api/v1/clients/c1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = call(&app, Method::GET, "/api/v1/clients/c1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), Some(2001));

    // Idempotent.
    let (status, _) = call(&app, Method::DELETE, "/api/v1/clients/c1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn blank_client_id_is_rejected() {
    let app = test_app();
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/clients",
        Some(json!({ "client_id": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), Some(1001));
}

#[tokio::test]
async fn dispatch_delivers_and_reports() {
    let app = test_app();
    assert!(app.engine.run().is_ok());
    register(&app, "c1").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/events/notify/dispatch",
        Some(json!({ "client_id": "c1", "data": "{\"text\":\"hi\"}" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("delivered").and_then(Value::as_bool), Some(true));
    assert_eq!(body.get("event").and_then(Value::as_str), Some("notify"));
    assert!(body.get("message_id").and_then(Value::as_str).is_some());

    let deliveries = app.transport.deliveries();
    let Some(delivery) = deliveries.first() else {
        panic!("expected a delivery");
    };
    assert_eq!(delivery.data, b"{\"text\":\"hi\"}".to_vec());

    let (_, events) = call(&app, Method::GET, "/api/v1/events", None).await;
    let notify = events
        .as_array()
        .and_then(|list| list.first())
        .and_then(|e| e.get("delivered"))
        .and_then(Value::as_u64);
    assert_eq!(notify, Some(1));
}

#[tokio::test]
async fn dispatch_failures_map_to_statuses() {
    let app = test_app();
    assert!(app.engine.run().is_ok());
    register(&app, "c1").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/events/missing/dispatch",
        Some(json!({ "client_id": "c1", "data": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_details(&body), Some("unknown_event"));

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/events/notify/dispatch",
        Some(json!({ "client_id": "ghost", "data": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), Some(2003));

    app.transport.set_failing(true);
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/events/notify/dispatch",
        Some(json!({ "client_id": "c1", "data": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(error_details(&body), Some("transport_failure"));
}

#[tokio::test]
async fn dispatch_times_out_when_nothing_consumes() {
    let app = test_app();
    register(&app, "c1").await;

    // The engine never runs, so the message waits in the queue.
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/events/notify/dispatch",
        Some(json!({ "client_id": "c1", "data": "x", "timeout_ms": 50 })),
    )
    .await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(error_details(&body), Some("ack_timeout"));
}

#[tokio::test]
async fn dispatch_after_shutdown_is_unavailable() {
    let app = test_app();
    assert!(app.engine.run().is_ok());
    register(&app, "c1").await;

    app.engine.shutdown();
    app.engine.wait_for_shutdown().await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/events/notify/dispatch",
        Some(json!({ "client_id": "c1", "data": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error_details(&body), Some("shutting_down"));
}

#[tokio::test]
async fn events_registered_at_runtime_accept_dispatch() {
    let app = test_app();
    assert!(app.engine.run().is_ok());
    register(&app, "c1").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/events",
        Some(json!({ "name": "alert", "capacity": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body.get("capacity").and_then(Value::as_u64), Some(4));

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/v1/events/alert/dispatch",
        Some(json!({ "client_id": "c1", "data": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/v1/events",
        Some(json!({ "name": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_event_capacity_is_rejected() {
    let app = test_app();
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/events",
        Some(json!({ "name": "big", "capacity": 18_446_744_073_709_551_615_u64 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), Some(1001));
    assert!(app.engine.get_event("big").is_none());

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/v1/events",
        Some(json!({ "name": "empty", "capacity": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[cfg(feature = "swagger-ui")]
#[tokio::test]
async fn openapi_document_is_served() {
    let app = test_app();
    let (status, body) = call(&app, Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    let paths = body.get("paths");
    assert!(paths.and_then(|p| p.get("/api/v1/events/{name}/dispatch")).is_some());
    assert!(paths.and_then(|p| p.get("/health")).is_some());
}
