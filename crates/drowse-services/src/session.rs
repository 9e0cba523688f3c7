//! Session registry — per-client detection state.
//!
//! The registry is a `DashMap` from session id to a session guarded by its
//! own `tokio::sync::Mutex`. Independent sessions never contend on a global
//! lock. Every state change for one session (auto-clear check, classify,
//! frame/alert counting, event append) happens under that session's mutex,
//! so concurrent calls for the same session are applied one at a time.
//!
//! A removed session is marked `retired` under its lock before the handle is
//! dropped. Callers that fetched the handle just before removal observe the
//! flag and fail with `UnknownSession` instead of mutating a dead session.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::Mutex;

use drowse_core::{
    classify, AlertMachine, AlertState, Clock, DetectError, Event, EventLog, Transition,
};

/// Stable session identifier: blake3(identity || created_at || nonce).
pub type SessionId = [u8; 32];

/// Per-registry knobs, usually derived from `DrowseConfig`.
#[derive(Debug, Clone, Copy)]
pub struct RegistrySettings {
    pub dwell_ms: u64,
    pub event_log_capacity: usize,
    /// 0 = sessions never go idle.
    pub idle_timeout_ms: u64,
    pub allow_concurrent_sessions: bool,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            dwell_ms: 3_000,
            event_log_capacity: 20,
            idle_timeout_ms: 900_000,
            allow_concurrent_sessions: true,
        }
    }
}

impl RegistrySettings {
    pub fn from_config(config: &drowse_core::config::DrowseConfig) -> Self {
        Self {
            dwell_ms: config.detection.dwell_ms,
            event_log_capacity: config.detection.event_log_capacity,
            idle_timeout_ms: config.sessions.idle_timeout_secs.saturating_mul(1_000),
            allow_concurrent_sessions: config.sessions.allow_concurrent_sessions,
        }
    }
}

/// Mutable state of one session. Only reachable through its mutex.
#[derive(Debug)]
struct Session {
    session_id: SessionId,
    identity: String,
    created_at: u64,
    last_activity: u64,
    /// Latest threshold a caller classified with, for reporting.
    threshold: Option<f64>,
    frame_count: u64,
    alert: AlertMachine,
    events: EventLog,
    retired: bool,
}

impl Session {
    fn new(session_id: SessionId, identity: String, now: u64, settings: &RegistrySettings) -> Self {
        Self {
            session_id,
            identity,
            created_at: now,
            last_activity: now,
            threshold: None,
            frame_count: 0,
            alert: AlertMachine::new(settings.dwell_ms),
            events: EventLog::new(settings.event_log_capacity),
            retired: false,
        }
    }

    fn short_id(&self) -> String {
        hex::encode(&self.session_id[..8])
    }

    /// Run the auto-clear timer. Returns true if the alert lapsed.
    fn expire(&mut self, now: u64) -> bool {
        match self.alert.expire(now) {
            Some(lapsed_at) => {
                self.events.append(Event {
                    timestamp: lapsed_at,
                    score: None,
                    is_alert: false,
                    message: "alert auto-cleared".to_string(),
                });
                tracing::debug!(session_id = %self.short_id(), "alert auto-cleared");
                true
            }
            None => false,
        }
    }

    fn classify(&mut self, score: f64, threshold: f64, now: u64) -> Classification {
        self.expire(now);

        let is_closed = classify(score, threshold);
        let transition = self.alert.observe(is_closed, now);
        self.frame_count += 1;
        self.threshold = Some(threshold);
        self.last_activity = now;

        let message = match transition {
            Transition::Raised => "drowsiness detected",
            Transition::Cleared => "alert cleared, eyes open",
            Transition::Held => "eyes closed",
            Transition::Steady => "eyes open",
        };
        self.events.append(Event {
            timestamp: now,
            score: Some(score),
            is_alert: self.alert.state() == AlertState::Raised,
            message: message.to_string(),
        });

        if transition == Transition::Raised {
            tracing::info!(
                session_id = %self.short_id(),
                ear = score,
                threshold,
                alert_count = self.alert.alert_count(),
                "drowsiness alert raised"
            );
        } else {
            tracing::debug!(
                session_id = %self.short_id(),
                ear = score,
                threshold,
                closed = is_closed,
                "sample classified"
            );
        }

        Classification {
            alert_state: self.alert.state(),
            ear: score,
            is_drowsy: is_closed,
            frame_count: self.frame_count,
            alert_count: self.alert.alert_count(),
            transition,
        }
    }

    fn trigger_test_alert(&mut self, now: u64) -> Transition {
        self.expire(now);
        let transition = self.alert.force_raise(now);
        self.last_activity = now;
        self.events.append(Event {
            timestamp: now,
            score: None,
            is_alert: true,
            message: "test alert triggered".to_string(),
        });
        tracing::info!(session_id = %self.short_id(), ?transition, "test alert triggered");
        transition
    }

    fn stats(&self, now: u64) -> SessionStats {
        SessionStats {
            elapsed_ms: now.saturating_sub(self.created_at),
            frame_count: self.frame_count,
            alert_count: self.alert.alert_count(),
        }
    }

    fn snapshot(&self, now: u64) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id,
            identity: self.identity.clone(),
            threshold: self.threshold,
            alert_state: self.alert.state(),
            last_raised_at: self.alert.last_raised_at(),
            created_at: self.created_at,
            last_activity: self.last_activity,
            stats: self.stats(now),
            event_count: self.events.len(),
        }
    }

    fn is_idle(&self, now: u64, idle_timeout_ms: u64) -> bool {
        idle_timeout_ms > 0 && now.saturating_sub(self.last_activity) >= idle_timeout_ms
    }
}

// ── Results ───────────────────────────────────────────────────────────────────

/// Outcome of classifying one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub alert_state: AlertState,
    pub ear: f64,
    pub is_drowsy: bool,
    pub frame_count: u64,
    pub alert_count: u64,
    pub transition: Transition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub elapsed_ms: u64,
    pub frame_count: u64,
    pub alert_count: u64,
}

/// Read-only view of a session at a point in time.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub identity: String,
    pub threshold: Option<f64>,
    pub alert_state: AlertState,
    pub last_raised_at: Option<u64>,
    pub created_at: u64,
    pub last_activity: u64,
    pub stats: SessionStats,
    pub event_count: usize,
}

/// What one sweep pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub auto_cleared: usize,
    pub expired: usize,
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// The session registry — cheap to clone, shared across API handlers and
/// the sweeper.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<SessionId, Arc<Mutex<Session>>>>,
    /// identity → session, only maintained when concurrent sessions are disallowed.
    identities: Arc<DashMap<String, SessionId>>,
    clock: Arc<dyn Clock>,
    settings: RegistrySettings,
}

impl SessionRegistry {
    pub fn new(clock: Arc<dyn Clock>, settings: RegistrySettings) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            identities: Arc::new(DashMap::new()),
            clock,
            settings,
        }
    }

    pub fn settings(&self) -> &RegistrySettings {
        &self.settings
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn contains(&self, session_id: &SessionId) -> bool {
        self.sessions.contains_key(session_id)
    }

    /// Allocate a fresh session for `identity`.
    pub fn create(&self, identity: &str) -> Result<SessionId, DetectError> {
        let now = self.clock.now_ms();
        let session_id = new_session_id(identity, now);

        if !self.settings.allow_concurrent_sessions {
            match self.identities.entry(identity.to_string()) {
                Entry::Occupied(_) => {
                    tracing::warn!(identity, "rejected overlapping session");
                    return Err(DetectError::DuplicateIdentity(identity.to_string()));
                }
                Entry::Vacant(slot) => {
                    slot.insert(session_id);
                }
            }
        }

        let session = Session::new(session_id, identity.to_string(), now, &self.settings);
        self.sessions
            .insert(session_id, Arc::new(Mutex::new(session)));

        tracing::info!(
            session_id = %hex::encode(&session_id[..8]),
            identity,
            "session created"
        );
        Ok(session_id)
    }

    /// Classify one sample and advance the session's alert state.
    pub async fn classify_sample(
        &self,
        session_id: &SessionId,
        score: f64,
        threshold: f64,
    ) -> Result<Classification, DetectError> {
        let handle = self.handle(session_id)?;
        let mut session = handle.lock().await;
        ensure_live(&session)?;
        let now = self.clock.now_ms();
        Ok(session.classify(score, threshold, now))
    }

    /// Manually raise the alert, as the "test alert" button does.
    pub async fn trigger_test_alert(&self, session_id: &SessionId) -> Result<Transition, DetectError> {
        let handle = self.handle(session_id)?;
        let mut session = handle.lock().await;
        ensure_live(&session)?;
        let now = self.clock.now_ms();
        Ok(session.trigger_test_alert(now))
    }

    pub async fn stats(&self, session_id: &SessionId) -> Result<SessionStats, DetectError> {
        let handle = self.handle(session_id)?;
        let mut session = handle.lock().await;
        ensure_live(&session)?;
        let now = self.clock.now_ms();
        session.expire(now);
        session.last_activity = now;
        Ok(session.stats(now))
    }

    /// Newest-first copy of the session's event log.
    pub async fn events(&self, session_id: &SessionId) -> Result<Vec<Event>, DetectError> {
        let handle = self.handle(session_id)?;
        let mut session = handle.lock().await;
        ensure_live(&session)?;
        let now = self.clock.now_ms();
        session.expire(now);
        session.last_activity = now;
        Ok(session.events.snapshot())
    }

    pub async fn inspect(&self, session_id: &SessionId) -> Result<SessionSnapshot, DetectError> {
        let handle = self.handle(session_id)?;
        let mut session = handle.lock().await;
        ensure_live(&session)?;
        let now = self.clock.now_ms();
        session.expire(now);
        session.last_activity = now;
        Ok(session.snapshot(now))
    }

    /// Snapshot every live session. Does not count as activity.
    pub async fn list(&self) -> Vec<SessionSnapshot> {
        let now = self.clock.now_ms();
        let mut out = Vec::with_capacity(self.sessions.len());
        for handle in self.handles() {
            let mut session = handle.lock().await;
            if session.retired {
                continue;
            }
            session.expire(now);
            out.push(session.snapshot(now));
        }
        out
    }

    /// Retire a session. Removing an absent session is a no-op; returns
    /// whether anything was removed.
    pub async fn remove(&self, session_id: &SessionId) -> bool {
        let Some((_, handle)) = self.sessions.remove(session_id) else {
            return false;
        };
        let mut session = handle.lock().await;
        session.retired = true;
        self.identities
            .remove_if(&session.identity, |_, id| id == session_id);
        tracing::info!(
            session_id = %session.short_id(),
            frames = session.frame_count,
            alerts = session.alert.alert_count(),
            "session removed"
        );
        true
    }

    /// Apply auto-clear to every raised session past its dwell and retire
    /// sessions idle longer than the configured timeout.
    pub async fn sweep(&self) -> SweepReport {
        let now = self.clock.now_ms();
        let mut report = SweepReport::default();

        for handle in self.handles() {
            let mut session = handle.lock().await;
            if session.retired {
                continue;
            }
            if session.expire(now) {
                report.auto_cleared += 1;
            }
            if session.is_idle(now, self.settings.idle_timeout_ms) {
                session.retired = true;
                let session_id = session.session_id;
                self.sessions.remove(&session_id);
                self.identities
                    .remove_if(&session.identity, |_, id| *id == session_id);
                tracing::info!(session_id = %session.short_id(), "idle session expired");
                report.expired += 1;
            }
        }

        report
    }

    fn handle(&self, session_id: &SessionId) -> Result<Arc<Mutex<Session>>, DetectError> {
        self.sessions
            .get(session_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| DetectError::UnknownSession(hex::encode(session_id)))
    }

    /// Clone out all handles so no map shard is held across an await.
    fn handles(&self) -> Vec<Arc<Mutex<Session>>> {
        self.sessions
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}

fn ensure_live(session: &Session) -> Result<(), DetectError> {
    if session.retired {
        Err(DetectError::UnknownSession(hex::encode(session.session_id)))
    } else {
        Ok(())
    }
}

fn new_session_id(identity: &str, now: u64) -> SessionId {
    let nonce: [u8; 16] = rand::random();
    let mut h = blake3::Hasher::new();
    h.update(identity.as_bytes());
    h.update(&now.to_le_bytes());
    h.update(&nonce);
    *h.finalize().as_bytes()
}
