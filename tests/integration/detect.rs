//! Classification, alert debounce and auto-clear over HTTP.

use serde_json::json;

use crate::{START_MS, approx, landmarks, spawn_server, spawn_server_with};
use drowse_services::RegistrySettings;

const OPEN: f64 = 0.3;
const CLOSED: f64 = 0.1;
const THRESHOLD: f64 = 0.2;

#[tokio::test]
async fn test_open_eyes_stay_clear() {
    let server = spawn_server().await.unwrap();
    let id = server.login_as("alice").await.unwrap();

    let (status, body) = server.detect(&id, OPEN, THRESHOLD).await.unwrap();
    assert_eq!(status, 200);
    assert_eq!(body["alert_state"], "clear");
    assert_eq!(body["is_drowsy"], false);
    assert_eq!(body["alert_raised"], false);
    assert_eq!(body["frame_count"], 1);
    assert_eq!(body["alert_count"], 0);
    assert_eq!(body["mode"], "landmarks");
    assert!(approx(&body["ear"], OPEN));
}

#[tokio::test]
async fn test_sustained_closure_raises_once() {
    let server = spawn_server().await.unwrap();
    let id = server.login_as("alice").await.unwrap();

    let (_, first) = server.detect(&id, CLOSED, THRESHOLD).await.unwrap();
    assert_eq!(first["alert_state"], "raised");
    assert_eq!(first["alert_raised"], true);
    assert_eq!(first["alert_count"], 1);

    for _ in 0..5 {
        server.clock.advance(100);
        let (_, body) = server.detect(&id, CLOSED, THRESHOLD).await.unwrap();
        assert_eq!(body["alert_state"], "raised");
        assert_eq!(body["alert_raised"], false);
        assert_eq!(body["alert_count"], 1);
    }

    let (_, stats) = server.get(&format!("/sessions/{id}/stats")).await.unwrap();
    assert_eq!(stats["frame_count"], 6);
    assert_eq!(stats["alert_count"], 1);
}

#[tokio::test]
async fn test_closed_open_closed_raises_twice() {
    let server = spawn_server().await.unwrap();
    let id = server.login_as("alice").await.unwrap();

    let (_, a) = server.detect(&id, CLOSED, THRESHOLD).await.unwrap();
    let (_, b) = server.detect(&id, OPEN, THRESHOLD).await.unwrap();
    let (_, c) = server.detect(&id, CLOSED, THRESHOLD).await.unwrap();

    assert_eq!(a["alert_state"], "raised");
    assert_eq!(b["alert_state"], "clear");
    assert_eq!(c["alert_state"], "raised");
    assert_eq!(c["alert_count"], 2);
    assert_eq!(c["frame_count"], 3);
}

#[tokio::test]
async fn test_score_equal_to_threshold_is_open() {
    let server = spawn_server().await.unwrap();
    let id = server.login_as("alice").await.unwrap();

    let (_, body) = server.detect(&id, 0.25, 0.25).await.unwrap();
    assert_eq!(body["is_drowsy"], false);
    assert_eq!(body["alert_state"], "clear");

    // The same score under a higher threshold counts as closed.
    let (_, body) = server.detect(&id, 0.25, 0.5).await.unwrap();
    assert_eq!(body["is_drowsy"], true);
    assert_eq!(body["alert_state"], "raised");
}

#[tokio::test]
async fn test_missing_threshold_uses_default() {
    let server = spawn_server().await.unwrap();
    let id = server.login_as("alice").await.unwrap();

    let (status, body) = server
        .post("/detect", json!({"session_id": id, "landmarks": landmarks(0.15)}))
        .await
        .unwrap();
    assert_eq!(status, 200);
    assert_eq!(body["is_drowsy"], true);
}

#[tokio::test]
async fn test_alert_auto_clears_after_dwell() {
    let server = spawn_server().await.unwrap();
    let id = server.login_as("alice").await.unwrap();

    server.detect(&id, CLOSED, THRESHOLD).await.unwrap();

    server.clock.advance(2_999);
    let (_, snap) = server.get(&format!("/sessions/{id}")).await.unwrap();
    assert_eq!(snap["alert_state"], "raised");

    server.clock.advance(1);
    let (_, snap) = server.get(&format!("/sessions/{id}")).await.unwrap();
    assert_eq!(snap["alert_state"], "clear");
    assert_eq!(snap["alert_count"], 1);

    let (_, log) = server.get(&format!("/sessions/{id}/events")).await.unwrap();
    let newest = &log["events"][0];
    assert_eq!(newest["message"], "alert auto-cleared");
    assert_eq!(newest["timestamp"], START_MS + 3_000);
    assert_eq!(newest["is_alert"], false);
    assert!(newest["score"].is_null());
}

#[tokio::test]
async fn test_closed_after_auto_clear_raises_again() {
    let server = spawn_server().await.unwrap();
    let id = server.login_as("alice").await.unwrap();

    server.detect(&id, CLOSED, THRESHOLD).await.unwrap();
    server.clock.advance(3_500);
    let (_, body) = server.detect(&id, CLOSED, THRESHOLD).await.unwrap();

    assert_eq!(body["alert_state"], "raised");
    assert_eq!(body["alert_raised"], true);
    assert_eq!(body["alert_count"], 2);
}

#[tokio::test]
async fn test_zero_dwell_never_auto_clears() {
    let settings = RegistrySettings {
        dwell_ms: 0,
        ..RegistrySettings::default()
    };
    let server = spawn_server_with(settings).await.unwrap();
    let id = server.login_as("alice").await.unwrap();

    server.detect(&id, CLOSED, THRESHOLD).await.unwrap();
    server.clock.advance(60_000);
    let (_, snap) = server.get(&format!("/sessions/{id}")).await.unwrap();
    assert_eq!(snap["alert_state"], "raised");
}

#[tokio::test]
async fn test_event_log_is_bounded_and_newest_first() {
    let server = spawn_server().await.unwrap();
    let id = server.login_as("alice").await.unwrap();

    for _ in 0..25 {
        server.clock.advance(10);
        server.detect(&id, OPEN, THRESHOLD).await.unwrap();
    }

    let (status, log) = server.get(&format!("/sessions/{id}/events")).await.unwrap();
    assert_eq!(status, 200);
    let events = log["events"].as_array().unwrap();
    assert_eq!(events.len(), 20);

    let stamps: Vec<u64> = events
        .iter()
        .map(|e| e["timestamp"].as_u64().unwrap())
        .collect();
    assert!(stamps.windows(2).all(|w| w[0] > w[1]));
    assert_eq!(stamps[0], START_MS + 250);
    assert!(events.iter().all(|e| e["message"] == "eyes open"));
}

#[tokio::test]
async fn test_test_alert_raises_without_counting_a_frame() {
    let server = spawn_server().await.unwrap();
    let id = server.login_as("alice").await.unwrap();

    let (status, body) = server
        .post(&format!("/sessions/{id}/test-alert"), json!({}))
        .await
        .unwrap();
    assert_eq!(status, 200);
    assert_eq!(body["raised"], true);
    assert_eq!(body["alert_state"], "raised");
    assert_eq!(body["alert_count"], 1);

    // Pressing again while raised is a no-op for the count.
    let (_, body) = server
        .post(&format!("/sessions/{id}/test-alert"), json!({}))
        .await
        .unwrap();
    assert_eq!(body["raised"], false);
    assert_eq!(body["alert_count"], 1);

    let (_, stats) = server.get(&format!("/sessions/{id}/stats")).await.unwrap();
    assert_eq!(stats["frame_count"], 0);

    let (_, log) = server.get(&format!("/sessions/{id}/events")).await.unwrap();
    assert_eq!(log["events"][0]["message"], "test alert triggered");
}

#[tokio::test]
async fn test_detect_rejects_bad_input() {
    let server = spawn_server().await.unwrap();
    let id = server.login_as("alice").await.unwrap();

    // No landmarks for the landmark source.
    let (status, _) = server
        .post("/detect", json!({"session_id": id, "image": "data:image/jpeg;base64,AAAA"}))
        .await
        .unwrap();
    assert_eq!(status, 400);

    // Malformed session id.
    let (status, _) = server
        .post("/detect", json!({"session_id": "xyz", "landmarks": landmarks(OPEN)}))
        .await
        .unwrap();
    assert_eq!(status, 400);

    // Well-formed but unknown.
    let (status, err) = server
        .post(
            "/detect",
            json!({"session_id": "00".repeat(32), "landmarks": landmarks(OPEN)}),
        )
        .await
        .unwrap();
    assert_eq!(status, 404);
    assert!(err["error"].is_string());

    // Rejected requests leave the session untouched.
    let (_, stats) = server.get(&format!("/sessions/{id}/stats")).await.unwrap();
    assert_eq!(stats["frame_count"], 0);
}
