//! Session stats, inspection, logout and idle expiry.

use crate::{START_MS, spawn_server};

#[tokio::test]
async fn test_stats_report_elapsed_time() {
    let server = spawn_server().await.unwrap();
    let id = server.login_as("alice").await.unwrap();

    server.clock.advance(4_250);
    let (status, stats) = server.get(&format!("/sessions/{id}/stats")).await.unwrap();
    assert_eq!(status, 200);
    assert_eq!(stats["session_id"], id.as_str());
    assert_eq!(stats["elapsed_ms"], 4_250);
    assert_eq!(stats["frame_count"], 0);
    assert_eq!(stats["alert_count"], 0);
}

#[tokio::test]
async fn test_inspect_shows_full_snapshot() {
    let server = spawn_server().await.unwrap();
    let id = server.login_as("alice").await.unwrap();

    server.clock.advance(2_000);
    server.detect(&id, 0.1, 0.2).await.unwrap();

    let (status, snap) = server.get(&format!("/sessions/{id}")).await.unwrap();
    assert_eq!(status, 200);
    assert_eq!(snap["session_id"], id.as_str());
    assert_eq!(snap["identity"], "alice");
    assert_eq!(snap["alert_state"], "raised");
    assert_eq!(snap["created_at"], START_MS);
    assert_eq!(snap["last_raised_at"], START_MS + 2_000);
    assert_eq!(snap["uptime_secs"], 2);
    assert_eq!(snap["frame_count"], 1);
    assert_eq!(snap["event_count"], 1);
    assert!(crate::approx(&snap["threshold"], 0.2));
}

#[tokio::test]
async fn test_logout_is_idempotent_and_ends_session() {
    let server = spawn_server().await.unwrap();
    let id = server.login_as("alice").await.unwrap();

    let (status, body) = server.delete(&format!("/sessions/{id}")).await.unwrap();
    assert_eq!(status, 200);
    assert_eq!(body["removed"], true);

    let (status, body) = server.delete(&format!("/sessions/{id}")).await.unwrap();
    assert_eq!(status, 200);
    assert_eq!(body["removed"], false);

    let (status, _) = server.detect(&id, 0.3, 0.2).await.unwrap();
    assert_eq!(status, 404);
    let (status, _) = server.get(&format!("/sessions/{id}/stats")).await.unwrap();
    assert_eq!(status, 404);
    let (status, _) = server.get(&format!("/sessions/{id}/events")).await.unwrap();
    assert_eq!(status, 404);
    assert!(server.registry.is_empty());
}

#[tokio::test]
async fn test_sweep_retires_idle_sessions() {
    let server = spawn_server().await.unwrap();
    let idle = server.login_as("alice").await.unwrap();

    server.clock.advance(600_000);
    let busy = server.login_as("bob").await.unwrap();

    // alice has been idle for the full 900 s timeout, bob for 300 s.
    server.clock.advance(300_000);
    let report = server.registry.sweep().await;
    assert_eq!(report.expired, 1);

    let (status, _) = server.get(&format!("/sessions/{idle}/stats")).await.unwrap();
    assert_eq!(status, 404);
    let (status, _) = server.get(&format!("/sessions/{busy}/stats")).await.unwrap();
    assert_eq!(status, 200);
}

#[tokio::test]
async fn test_sweep_auto_clears_raised_alerts() {
    let server = spawn_server().await.unwrap();
    let id = server.login_as("alice").await.unwrap();
    server.detect(&id, 0.1, 0.2).await.unwrap();

    server.clock.advance(3_000);
    let report = server.registry.sweep().await;
    assert_eq!(report.auto_cleared, 1);
    assert_eq!(report.expired, 0);

    let (_, log) = server.get(&format!("/sessions/{id}/events")).await.unwrap();
    assert_eq!(log["events"][0]["message"], "alert auto-cleared");
}
