//! Background sweep — the timer half of the alert machine.
//!
//! Runs `SessionRegistry::sweep` on a fixed interval: raised alerts past
//! their dwell are auto-cleared and idle sessions are retired. The loop only
//! ever visits sessions still in the registry, so nothing outlives removal.

use std::time::Duration;

use anyhow::Result;
use tokio::sync::broadcast;

use crate::session::SessionRegistry;

pub async fn sweep_loop(
    registry: SessionRegistry,
    every: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let report = registry.sweep().await;
                if report.auto_cleared > 0 || report.expired > 0 {
                    tracing::debug!(
                        auto_cleared = report.auto_cleared,
                        expired = report.expired,
                        remaining = registry.len(),
                        "session sweep"
                    );
                }
            }
            _ = shutdown.recv() => {
                tracing::info!("sweeper stopping");
                return Ok(());
            }
        }
    }
}
