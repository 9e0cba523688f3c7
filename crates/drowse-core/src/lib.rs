//! drowse-core — the pure pieces of the drowsiness pipeline.
//! Configuration, clock, classifier, alert state machine and event log.
//! Nothing here performs I/O beyond reading the config file.

pub mod alert;
pub mod classify;
pub mod clock;
pub mod config;
pub mod error;
pub mod event_log;

pub use alert::{AlertMachine, AlertState, Transition};
pub use classify::classify;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{AccountError, DetectError};
pub use event_log::{Event, EventLog};
