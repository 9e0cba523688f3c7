//! /ping and /status.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use drowse_core::AlertState;

use super::ApiState;

// ── /ping ─────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct PingResponse {
    pub status: &'static str,
}

pub async fn handle_ping() -> Json<PingResponse> {
    Json(PingResponse { status: "ok" })
}

// ── /status ───────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct StatusResponse {
    pub mode: String,
    pub default_threshold: f64,
    pub accounts: usize,
    pub sessions: Vec<SessionInfo>,
}

#[derive(Serialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub identity: String,
    pub alert_state: AlertState,
    pub frame_count: u64,
    pub alert_count: u64,
    pub established_secs: u64,
}

pub async fn handle_status(State(state): State<ApiState>) -> Json<StatusResponse> {
    let sessions = state
        .sessions()
        .list()
        .await
        .into_iter()
        .map(|s| SessionInfo {
            session_id: hex::encode(s.session_id),
            identity: s.identity,
            alert_state: s.alert_state,
            frame_count: s.stats.frame_count,
            alert_count: s.stats.alert_count,
            established_secs: s.stats.elapsed_ms / 1_000,
        })
        .collect();

    Json(StatusResponse {
        mode: state.detector.mode().to_string(),
        default_threshold: state.detector.default_threshold(),
        accounts: state.accounts.len(),
        sessions,
    })
}
