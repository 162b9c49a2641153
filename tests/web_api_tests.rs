//! Integration tests for the web API.
//!
//! These tests verify the HTTP API endpoints work correctly.

#![cfg(feature = "web")]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use rover_dispatch::hal::MockActuator;
use rover_dispatch::services::{
    build_router, ApiResponse, CommandResponse, SharedDispatcher, StateResponse, WebServerConfig,
};
use rover_dispatch::{Direction, Dispatcher};

fn create_test_app() -> (axum::Router, Arc<SharedDispatcher<MockActuator>>) {
    let dispatcher = Dispatcher::new(MockActuator::new());
    let state = Arc::new(SharedDispatcher::new(dispatcher));
    let config = WebServerConfig::default();
    let router = build_router(Arc::clone(&state), &config);
    (router, state)
}

async fn post(app: &axum::Router, uri: &str, body: impl Into<Body>) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn submit(app: &axum::Router, body: &str) -> ApiResponse<CommandResponse> {
    let (status, body) = post(app, "/api/command", body.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&body).unwrap()
}

async fn get_state(app: &axum::Router) -> StateResponse {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/state")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: ApiResponse<StateResponse> = serde_json::from_slice(&body).unwrap();
    assert!(json.success);
    json.data.unwrap()
}

#[tokio::test]
async fn test_get_state_idle() {
    let (app, _state) = create_test_app();

    let data = get_state(&app).await;
    assert!(!data.running);
    assert!(!data.driving);
    assert_eq!(data.capacity, 20);
    assert!(data.current.is_none());
    assert!(data.pending.is_empty());
}

#[tokio::test]
async fn test_submit_plain_text() {
    let (app, state) = create_test_app();

    let json = submit(&app, "forward-2-50").await;
    assert!(json.success);
    let data = json.data.unwrap();
    assert_eq!(data.return_value, 1);
    assert_eq!(data.status, "ran");

    assert!(state.state().driving);
}

#[tokio::test]
async fn test_submit_json_body() {
    let (app, _state) = create_test_app();

    submit(&app, "forward-0").await;
    let json = submit(&app, r#"{"command": "left-1-30"}"#).await;
    assert_eq!(json.data.map(|d| d.return_value), Some(2));

    let data = get_state(&app).await;
    assert_eq!(data.pending, ["left-1-30"]);
    let current = data.current.unwrap();
    assert_eq!(current.direction, Direction::Forward);
    assert_eq!(current.duration_s, 0);
}

#[tokio::test]
async fn test_submit_failures_report_negative_codes() {
    let (app, _state) = create_test_app();

    let json = submit(&app, "sideways").await;
    assert!(!json.success);
    assert_eq!(json.data.unwrap().return_value, -4);

    let json = submit(&app, "*n").await;
    assert_eq!(json.data.unwrap().return_value, -3);

    let json = submit(&app, "*z").await;
    assert_eq!(json.data.unwrap().return_value, -1);
}

#[tokio::test]
async fn test_submit_queue_full() {
    let (app, state) = create_test_app();

    submit(&app, "forward-0").await;
    for _ in 0..20 {
        state.submit("right-1");
    }

    let json = submit(&app, "left-1").await;
    assert!(!json.success);
    let data = json.data.unwrap();
    assert_eq!(data.return_value, -2);
    assert_eq!(data.status, "queue_full");
}

#[tokio::test]
async fn test_submit_malformed_json() {
    let (app, _state) = create_test_app();

    let (status, body) = post(&app, "/api/command", r#"{"cmd": "forward"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: ApiResponse<CommandResponse> = serde_json::from_slice(&body).unwrap();
    assert!(!json.success);
    assert!(json.error.is_some());
}

#[tokio::test]
async fn test_submit_invalid_utf8() {
    let (app, _state) = create_test_app();

    let (status, _) = post(&app, "/api/command", vec![0xffu8, 0xfe]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reset() {
    let (app, state) = create_test_app();

    submit(&app, "forward-0").await;
    submit(&app, "back-1").await;

    let (status, body) = post(&app, "/api/reset", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    let json: ApiResponse<CommandResponse> = serde_json::from_slice(&body).unwrap();
    assert!(json.success);

    let snapshot = state.state();
    assert!(!snapshot.running);
    assert_eq!(snapshot.pending, 0);
    state.with_dispatcher(|d| assert!(d.actuator().is_stopped()));
}

#[tokio::test]
async fn test_not_found() {
    let (app, _state) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_state_is_shared_with_other_transports() {
    let (app, state) = create_test_app();

    // e.g. the console or MQTT submitting on the same state
    state.submit("right-3-70");

    let data = get_state(&app).await;
    assert!(data.running);
    let current = data.current.unwrap();
    assert_eq!(current.direction, Direction::Right);
    assert_eq!(current.speed, 70);
}
