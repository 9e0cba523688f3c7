//! Account registration and login.

use serde_json::json;

use crate::spawn_server;
use crate::spawn_server_with;
use drowse_services::RegistrySettings;

#[tokio::test]
async fn test_register_then_login_opens_session() {
    let server = spawn_server().await.unwrap();

    let (status, body) = server
        .post(
            "/register",
            json!({"username": "alice", "email": "a@example.com", "password": "pw"}),
        )
        .await
        .unwrap();
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["username"], "alice");

    let (status, body) = server
        .post("/login", json!({"username": "alice", "password": "pw"}))
        .await
        .unwrap();
    assert_eq!(status, 200);
    assert_eq!(body["identity"], "alice");
    let id = body["session_id"].as_str().unwrap();
    assert_eq!(id.len(), 64);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(server.registry.len(), 1);
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_blank_names() {
    let server = spawn_server().await.unwrap();
    let body = json!({"username": "bob", "password": "pw"});

    let (status, _) = server.post("/register", body.clone()).await.unwrap();
    assert_eq!(status, 200);

    let (status, err) = server.post("/register", body).await.unwrap();
    assert_eq!(status, 409);
    assert!(err["error"].as_str().unwrap().contains("bob"));

    let (status, _) = server
        .post("/register", json!({"username": "", "password": "pw"}))
        .await
        .unwrap();
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_bad_credentials_are_unauthorized() {
    let server = spawn_server().await.unwrap();
    server.login_as("carol").await.unwrap();

    let (status, err) = server
        .post("/login", json!({"username": "carol", "password": "wrong"}))
        .await
        .unwrap();
    assert_eq!(status, 401);
    assert!(err["error"].is_string());

    let (status, _) = server
        .post("/login", json!({"username": "nobody", "password": "pw"}))
        .await
        .unwrap();
    assert_eq!(status, 401);

    // Only the successful login created a session.
    assert_eq!(server.registry.len(), 1);
}

#[tokio::test]
async fn test_each_login_gets_a_fresh_session() {
    let server = spawn_server().await.unwrap();
    let a = server.login_as("dave").await.unwrap();
    let b = server.login_as("dave").await.unwrap();
    assert_ne!(a, b);
    assert_eq!(server.registry.len(), 2);
}

#[tokio::test]
async fn test_exclusive_sessions_reject_second_login() {
    let settings = RegistrySettings {
        allow_concurrent_sessions: false,
        ..RegistrySettings::default()
    };
    let server = spawn_server_with(settings).await.unwrap();
    let first = server.login_as("erin").await.unwrap();

    let (status, _) = server
        .post("/login", json!({"username": "erin", "password": "pw"}))
        .await
        .unwrap();
    assert_eq!(status, 409);

    // Logging out frees the identity again.
    let (status, _) = server.delete(&format!("/sessions/{first}")).await.unwrap();
    assert_eq!(status, 200);
    let second = server.login_as("erin").await.unwrap();
    assert_ne!(first, second);
}
