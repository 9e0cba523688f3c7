pub mod handlers;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

pub use handlers::ApiState;

/// Build the full route table. Exposed separately from [`serve`] so tests
/// can mount it on their own listener.
pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ping", get(handlers::handle_ping))
        .route("/status", get(handlers::handle_status))
        .route("/register", post(handlers::handle_register))
        .route("/login", post(handlers::handle_login))
        .route("/detect", post(handlers::handle_detect))
        .route(
            "/sessions/{id}",
            get(handlers::handle_session_inspect).delete(handlers::handle_session_drop),
        )
        .route("/sessions/{id}/stats", get(handlers::handle_session_stats))
        .route("/sessions/{id}/events", get(handlers::handle_session_events))
        .route("/sessions/{id}/test-alert", post(handlers::handle_test_alert))
        .with_state(state)
        .layer(cors)
}

pub async fn serve(state: ApiState, host: &str, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    serve_on(state, listener).await
}

pub async fn serve_on(state: ApiState, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "API listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
