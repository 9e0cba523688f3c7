//! HTTP API handlers — JSON in, JSON out.

pub mod auth;
pub mod detect;
pub mod sessions;
pub mod status;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use drowse_core::{AccountError, DetectError};
use drowse_services::{AccountStore, DetectionError, DetectionService, SessionId, SessionRegistry};

#[derive(Clone)]
pub struct ApiState {
    pub detector: DetectionService,
    pub accounts: AccountStore,
}

impl ApiState {
    pub fn new(detector: DetectionService, accounts: AccountStore) -> Self {
        Self { detector, accounts }
    }

    pub fn sessions(&self) -> &SessionRegistry {
        self.detector.registry()
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Failure rendered as `{"error": "..."}` with a distinct status per kind.
#[derive(Debug)]
pub struct ApiError(pub StatusCode, pub String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(serde_json::json!({ "error": self.1 }))).into_response()
    }
}

impl From<DetectError> for ApiError {
    fn from(e: DetectError) -> Self {
        let status = match e {
            DetectError::UnknownSession(_) => StatusCode::NOT_FOUND,
            DetectError::DuplicateIdentity(_) => StatusCode::CONFLICT,
        };
        ApiError(status, e.to_string())
    }
}

impl From<AccountError> for ApiError {
    fn from(e: AccountError) -> Self {
        let status = match e {
            AccountError::UsernameRequired => StatusCode::BAD_REQUEST,
            AccountError::UserExists(_) => StatusCode::CONFLICT,
            AccountError::InvalidLogin => StatusCode::UNAUTHORIZED,
        };
        ApiError(status, e.to_string())
    }
}

impl From<DetectionError> for ApiError {
    fn from(e: DetectionError) -> Self {
        match e {
            DetectionError::Session(e) => e.into(),
            DetectionError::Source(e) => ApiError(StatusCode::BAD_REQUEST, e.to_string()),
        }
    }
}

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Parse a hex-encoded 32-byte session ID.
fn parse_session_id(hex_str: &str) -> Result<SessionId, ApiError> {
    let bytes = hex::decode(hex_str)
        .map_err(|_| ApiError(StatusCode::BAD_REQUEST, "invalid hex".to_string()))?;
    let id: SessionId = bytes.try_into().map_err(|_| {
        ApiError(
            StatusCode::BAD_REQUEST,
            "session_id must be 32 bytes".to_string(),
        )
    })?;
    Ok(id)
}

// Re-export handler functions for use in router setup.
pub use auth::{handle_login, handle_register};
pub use detect::{handle_detect, handle_test_alert};
pub use sessions::{
    handle_session_drop, handle_session_events, handle_session_inspect, handle_session_stats,
};
pub use status::{handle_ping, handle_status};
