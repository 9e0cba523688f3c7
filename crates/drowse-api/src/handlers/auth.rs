//! /register and /login.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiState};

// ── /register (POST) ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub username: String,
}

pub async fn handle_register(
    State(state): State<ApiState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    state
        .accounts
        .register(&req.username, req.email.as_deref(), &req.password)?;

    Ok(Json(RegisterResponse {
        success: true,
        username: req.username,
    }))
}

// ── /login (POST) ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub session_id: String,
    pub identity: String,
}

pub async fn handle_login(
    State(state): State<ApiState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let identity = state.accounts.login(&req.username, &req.password)?;
    let session_id = state.sessions().create(&identity)?;

    Ok(Json(LoginResponse {
        success: true,
        session_id: hex::encode(session_id),
        identity,
    }))
}
