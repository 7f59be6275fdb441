//! Integration tests for the web API.
//!
//! These tests drive the router directly with `oneshot` and a mock
//! transmitter, so no socket or `irsend` binary is needed.

#![cfg(feature = "web")]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use ir_trainz::hal::MockTransmitter;
use ir_trainz::services::{
    build_router, ApiReply, DeliveriesResponse, DeliveryOutcome, PinsResponse, SharedState,
    UsageResponse, WebServerConfig,
};
use ir_trainz::PinEvent;

fn create_test_app() -> (axum::Router, Arc<SharedState<MockTransmitter>>) {
    create_app_with(MockTransmitter::new())
}

fn create_app_with(
    transmitter: MockTransmitter,
) -> (axum::Router, Arc<SharedState<MockTransmitter>>) {
    let state = Arc::new(SharedState::new(transmitter));
    let config = WebServerConfig::default();
    let router = build_router(Arc::clone(&state), &config);
    (router, state)
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, axum::body::Bytes) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body)
}

// ============================================================================
// Train Commands
// ============================================================================

#[tokio::test]
async fn test_set_speed_forward() {
    let (app, state) = create_test_app();

    let (status, body) = get(app, "/api/train/2B/speed/7").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, serde_json::json!({"message": "Train speed set to 7"}));
    assert_eq!(state.transmitter().sent(), vec!["2B_7".to_string()]);
}

#[tokio::test]
async fn test_set_speed_reverse() {
    let (app, state) = create_test_app();

    let (status, body) = get(app, "/api/train/1R/speed/-4").await;

    assert_eq!(status, StatusCode::OK);
    let reply: ApiReply = serde_json::from_slice(&body).unwrap();
    assert_eq!(reply, ApiReply::message("Train speed set to -4"));
    assert_eq!(state.transmitter().sent(), vec!["1R_M4".to_string()]);
}

#[tokio::test]
async fn test_message_echoes_raw_speed() {
    let (app, state) = create_test_app();

    let (_, body) = get(app, "/api/train/1B/speed/-0").await;

    let reply: ApiReply = serde_json::from_slice(&body).unwrap();
    assert_eq!(reply, ApiReply::message("Train speed set to -0"));
    assert_eq!(state.transmitter().sent(), vec!["1B_0".to_string()]);
}

#[tokio::test]
async fn test_stop() {
    let (app, state) = create_test_app();

    let (status, body) = get(app, "/api/train/2R/stop").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, serde_json::json!({"message": "Train stopped"}));
    assert_eq!(state.transmitter().sent(), vec!["2R_BRAKE".to_string()]);
}

// ============================================================================
// Validation Errors
// ============================================================================

#[tokio::test]
async fn test_stop_invalid_channel() {
    let (app, state) = create_test_app();

    let (status, body) = get(app, "/api/train/9X/stop").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, serde_json::json!({"error": "Not a valid channel (9X)"}));
    assert_eq!(state.transmitter().call_count(), 0);
}

#[tokio::test]
async fn test_speed_out_of_range() {
    let (app, state) = create_test_app();

    let (status, body) = get(app, "/api/train/1B/speed/8").await;

    assert_eq!(status, StatusCode::OK);
    let reply: ApiReply = serde_json::from_slice(&body).unwrap();
    assert_eq!(reply, ApiReply::error("Not a valid speed (8)"));
    assert_eq!(state.transmitter().call_count(), 0);
}

#[tokio::test]
async fn test_speed_not_a_number() {
    let (app, state) = create_test_app();

    let (_, body) = get(app, "/api/train/2B/speed/fast").await;

    let reply: ApiReply = serde_json::from_slice(&body).unwrap();
    assert_eq!(reply, ApiReply::error("Not a valid speed (fast)"));
    assert_eq!(state.transmitter().call_count(), 0);
}

#[tokio::test]
async fn test_bad_channel_reported_before_bad_speed() {
    let (app, state) = create_test_app();

    let (_, body) = get(app, "/api/train/3B/speed/99").await;

    let reply: ApiReply = serde_json::from_slice(&body).unwrap();
    assert_eq!(reply, ApiReply::error("Not a valid channel (3B)"));
    assert_eq!(state.transmitter().call_count(), 0);
}

// ============================================================================
// Usage, Deliveries and Pins
// ============================================================================

#[tokio::test]
async fn test_usage() {
    for uri in ["/api", "/api/"] {
        let (app, _state) = create_test_app();

        let (status, body) = get(app, uri).await;

        assert_eq!(status, StatusCode::OK);
        let json: UsageResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json.usage,
            "train/{channel}/speed/{-7 to 7} | train/{channel}/stop"
        );
    }
}

#[tokio::test]
async fn test_deliveries_report_outcome() {
    let (app, state) = create_app_with(MockTransmitter::holding());

    let (_, _) = get(app.clone(), "/api/train/1B/speed/3").await;
    state.transmitter().complete_pending(Ok(()));

    for _ in 0..100 {
        if state.deliveries()[0].outcome != DeliveryOutcome::Pending {
            break;
        }
        tokio::task::yield_now().await;
    }

    let (status, body) = get(app, "/api/deliveries").await;

    assert_eq!(status, StatusCode::OK);
    let json: DeliveriesResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(json.deliveries.len(), 1);
    assert_eq!(json.deliveries[0].token, "1B_3");
    assert_eq!(json.deliveries[0].outcome, DeliveryOutcome::Sent);
}

#[tokio::test]
async fn test_response_does_not_wait_for_delivery() {
    let (app, state) = create_app_with(MockTransmitter::holding());

    let (status, body) = get(app, "/api/train/2B/stop").await;

    assert_eq!(status, StatusCode::OK);
    let reply: ApiReply = serde_json::from_slice(&body).unwrap();
    assert!(reply.is_message());
    assert_eq!(state.deliveries()[0].outcome, DeliveryOutcome::Pending);
}

#[tokio::test]
async fn test_pins() {
    let (app, state) = create_test_app();
    state.record_pin(PinEvent::new(20, 0));
    state.record_pin(PinEvent::new(21, 1));

    let (status, body) = get(app, "/api/pins").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, serde_json::json!({"pins": {"20": 0, "21": 1}}));

    let typed: PinsResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(typed.pins.get(&21), Some(&1));
}

// ============================================================================
// Fallback and CORS
// ============================================================================

#[tokio::test]
async fn test_404_fallback() {
    let (app, _state) = create_test_app();

    let (status, body) = get(app, "/api/nonexistent").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, serde_json::json!({"error": "Not found"}));
}

#[tokio::test]
async fn test_missing_speed_segment_is_404() {
    let (app, state) = create_test_app();

    let (status, _) = get(app, "/api/train/1B/speed").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(state.transmitter().call_count(), 0);
}

#[tokio::test]
async fn test_cors_headers() {
    let (app, _state) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api")
                .header("Origin", "http://example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response
        .headers()
        .contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_no_cors_when_disabled() {
    let state = Arc::new(SharedState::new(MockTransmitter::new()));
    let router = build_router(state, &WebServerConfig::default().cors(false));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api")
                .header("Origin", "http://example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(!response
        .headers()
        .contains_key("access-control-allow-origin"));
}
