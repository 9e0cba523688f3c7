//! Alert state machine — turns a stream of eyes-closed decisions into
//! alert raise/clear transitions.
//!
//!   Clear  --closed-->  Raised   (alert_count += 1, last_raised_at = t)
//!   Raised --open---->  Clear
//!   Raised --closed-->  Raised   (debounce: no new alert)
//!   Raised --dwell--->  Clear    (time-driven, see [`AlertMachine::expire`])
//!
//! The machine only tracks alert state. Frame counting and event logging
//! belong to the session that owns it.

use serde::{Deserialize, Serialize};

/// Whether the drowsiness alert is currently showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertState {
    #[default]
    Clear,
    Raised,
}

/// What a single sample (or forced raise) did to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Clear -> Raised.
    Raised,
    /// Raised -> Clear on an open-eyes sample.
    Cleared,
    /// Raised and still closed.
    Held,
    /// Clear and still open.
    Steady,
}

#[derive(Debug, Clone)]
pub struct AlertMachine {
    state: AlertState,
    alert_count: u64,
    last_raised_at: Option<u64>,
    /// Auto-clear dwell in ms. 0 disables auto-clear.
    dwell_ms: u64,
}

impl AlertMachine {
    pub fn new(dwell_ms: u64) -> Self {
        Self {
            state: AlertState::Clear,
            alert_count: 0,
            last_raised_at: None,
            dwell_ms,
        }
    }

    pub fn state(&self) -> AlertState {
        self.state
    }

    pub fn alert_count(&self) -> u64 {
        self.alert_count
    }

    pub fn last_raised_at(&self) -> Option<u64> {
        self.last_raised_at
    }

    pub fn dwell_ms(&self) -> u64 {
        self.dwell_ms
    }

    /// Apply the auto-clear timer at `now_ms`.
    ///
    /// Returns the instant the alert lapsed (`last_raised_at + dwell`) when
    /// the machine moved to Clear, so callers can stamp the event at the
    /// moment it actually expired rather than when it was noticed.
    pub fn expire(&mut self, now_ms: u64) -> Option<u64> {
        if self.dwell_ms == 0 || self.state != AlertState::Raised {
            return None;
        }
        let raised_at = self.last_raised_at?;
        if now_ms.saturating_sub(raised_at) >= self.dwell_ms {
            self.state = AlertState::Clear;
            Some(raised_at.saturating_add(self.dwell_ms))
        } else {
            None
        }
    }

    /// Feed one eyes-closed decision taken at `now_ms`.
    pub fn observe(&mut self, is_closed: bool, now_ms: u64) -> Transition {
        match (self.state, is_closed) {
            (AlertState::Clear, true) => self.raise(now_ms),
            (AlertState::Clear, false) => Transition::Steady,
            (AlertState::Raised, true) => Transition::Held,
            (AlertState::Raised, false) => {
                self.state = AlertState::Clear;
                Transition::Cleared
            }
        }
    }

    /// Raise without a sample (manual test trigger). Debounced like a
    /// closed-eyes sample: an already raised alert is not counted again.
    pub fn force_raise(&mut self, now_ms: u64) -> Transition {
        match self.state {
            AlertState::Clear => self.raise(now_ms),
            AlertState::Raised => Transition::Held,
        }
    }

    fn raise(&mut self, now_ms: u64) -> Transition {
        self.state = AlertState::Raised;
        self.alert_count += 1;
        self.last_raised_at = Some(now_ms);
        Transition::Raised
    }
}
