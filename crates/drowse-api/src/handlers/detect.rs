//! /detect and /sessions/{id}/test-alert.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use drowse_core::{AlertState, Transition};
use drowse_services::{EyeLandmarks, Frame};

use super::{parse_session_id, ApiError, ApiState};

// ── /detect (POST) ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct DetectRequest {
    #[serde(alias = "client_id")]
    pub session_id: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub landmarks: Option<EyeLandmarks>,
    /// Falls back to the configured default when absent.
    #[serde(default)]
    pub threshold: Option<f64>,
}

#[derive(Serialize)]
pub struct DetectResponse {
    pub alert_state: AlertState,
    pub ear: f64,
    pub is_drowsy: bool,
    pub frame_count: u64,
    pub alert_count: u64,
    pub alert_raised: bool,
    pub mode: String,
}

pub async fn handle_detect(
    State(state): State<ApiState>,
    Json(req): Json<DetectRequest>,
) -> Result<Json<DetectResponse>, ApiError> {
    let id = parse_session_id(&req.session_id)?;
    let frame = Frame {
        image: req.image,
        landmarks: req.landmarks,
    };

    let d = state.detector.detect(&id, &frame, req.threshold).await?;

    Ok(Json(DetectResponse {
        alert_state: d.alert_state,
        ear: d.ear,
        is_drowsy: d.is_drowsy,
        frame_count: d.frame_count,
        alert_count: d.alert_count,
        alert_raised: d.alert_raised,
        mode: d.mode.to_string(),
    }))
}

// ── /sessions/{id}/test-alert (POST) ──────────────────────────────────────────

#[derive(Serialize)]
pub struct TestAlertResponse {
    pub session_id: String,
    pub raised: bool,
    pub alert_state: AlertState,
    pub alert_count: u64,
}

pub async fn handle_test_alert(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> Result<Json<TestAlertResponse>, ApiError> {
    let id = parse_session_id(&session_id)?;
    let transition = state.sessions().trigger_test_alert(&id).await?;
    let snap = state.sessions().inspect(&id).await?;

    Ok(Json(TestAlertResponse {
        session_id,
        raised: transition == Transition::Raised,
        alert_state: snap.alert_state,
        alert_count: snap.stats.alert_count,
    }))
}
