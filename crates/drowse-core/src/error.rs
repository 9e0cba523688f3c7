//! Failure kinds surfaced by the core to the dispatch layer.

/// Errors from session-scoped operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DetectError {
    /// The referenced session is not (or no longer) in the registry.
    #[error("unknown session: {0}")]
    UnknownSession(String),
    /// The identity already holds a live session and overlap is disabled.
    #[error("identity already has an active session: {0}")]
    DuplicateIdentity(String),
}

/// Errors from account registration and login.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountError {
    #[error("username required")]
    UsernameRequired,
    #[error("user exists: {0}")]
    UserExists(String),
    #[error("invalid login")]
    InvalidLogin,
}
