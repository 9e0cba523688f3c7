//! /sessions handlers — stats, event log, inspection, logout.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use drowse_core::{AlertState, Event};

use super::{parse_session_id, ApiError, ApiState};

// ── /sessions/{id}/stats (GET) ────────────────────────────────────────────────

#[derive(Serialize)]
pub struct StatsResponse {
    pub session_id: String,
    pub elapsed_ms: u64,
    pub frame_count: u64,
    pub alert_count: u64,
}

pub async fn handle_session_stats(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> Result<Json<StatsResponse>, ApiError> {
    let id = parse_session_id(&session_id)?;
    let stats = state.sessions().stats(&id).await?;

    Ok(Json(StatsResponse {
        session_id,
        elapsed_ms: stats.elapsed_ms,
        frame_count: stats.frame_count,
        alert_count: stats.alert_count,
    }))
}

// ── /sessions/{id}/events (GET) ───────────────────────────────────────────────

#[derive(Serialize)]
pub struct EventsResponse {
    pub session_id: String,
    /// Newest first.
    pub events: Vec<Event>,
}

pub async fn handle_session_events(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> Result<Json<EventsResponse>, ApiError> {
    let id = parse_session_id(&session_id)?;
    let events = state.sessions().events(&id).await?;
    Ok(Json(EventsResponse { session_id, events }))
}

// ── /sessions/{id} (GET) ──────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct SessionInspectResponse {
    pub session_id: String,
    pub identity: String,
    pub threshold: Option<f64>,
    pub alert_state: AlertState,
    pub last_raised_at: Option<u64>,
    pub created_at: u64,
    pub uptime_secs: u64,
    pub frame_count: u64,
    pub alert_count: u64,
    pub event_count: usize,
}

pub async fn handle_session_inspect(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionInspectResponse>, ApiError> {
    let id = parse_session_id(&session_id)?;
    let snap = state.sessions().inspect(&id).await?;

    Ok(Json(SessionInspectResponse {
        session_id: hex::encode(snap.session_id),
        identity: snap.identity,
        threshold: snap.threshold,
        alert_state: snap.alert_state,
        last_raised_at: snap.last_raised_at,
        created_at: snap.created_at,
        uptime_secs: snap.stats.elapsed_ms / 1_000,
        frame_count: snap.stats.frame_count,
        alert_count: snap.stats.alert_count,
        event_count: snap.event_count,
    }))
}

// ── /sessions/{id} (DELETE) ───────────────────────────────────────────────────

#[derive(Serialize)]
pub struct SessionDropResponse {
    pub session_id: String,
    pub removed: bool,
}

pub async fn handle_session_drop(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionDropResponse>, ApiError> {
    let id = parse_session_id(&session_id)?;
    let removed = state.sessions().remove(&id).await;

    if removed {
        tracing::info!(session_id = %&session_id[..16], "session dropped via API");
    }

    Ok(Json(SessionDropResponse {
        session_id,
        removed,
    }))
}
