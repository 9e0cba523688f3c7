//! drowsed — drowsiness detection daemon.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use drowse_core::config::DrowseConfig;
use drowse_core::SystemClock;
use drowse_services::{
    build_source, sweep_loop, AccountStore, DetectionService, RegistrySettings, SessionRegistry,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config
    if let Err(e) = DrowseConfig::write_default_if_missing() {
        tracing::warn!(error = %e, "failed to write default config");
    }
    let config = DrowseConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        DrowseConfig::default()
    });
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        source = ?config.detection.source,
        threshold = config.detection.default_threshold,
        dwell_ms = config.detection.dwell_ms,
        "drowsed starting"
    );

    // Shared state
    let registry = SessionRegistry::new(
        Arc::new(SystemClock),
        RegistrySettings::from_config(&config),
    );
    let source = build_source(config.detection.source);
    let detector =
        DetectionService::new(registry.clone(), source, config.detection.default_threshold);
    let accounts = AccountStore::new();

    // ── Shutdown channel ─────────────────────────────────────────────────────
    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);

    {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutdown signal received");
            let _ = shutdown.send(());
        });
    }

    // ── Spawn tasks ──────────────────────────────────────────────────────────

    let sweep_every = Duration::from_millis(config.sessions.sweep_interval_ms.max(10));
    let sweeper_task = tokio::spawn(sweep_loop(
        registry.clone(),
        sweep_every,
        shutdown_tx.subscribe(),
    ));

    let api_task = {
        let state = drowse_api::ApiState::new(detector, accounts);
        let host = config.server.host.clone();
        let port = config.server.port;
        tokio::spawn(async move { drowse_api::serve(state, &host, port).await })
    };

    let session_printer = {
        let registry = registry.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(30));
            loop {
                interval.tick().await;
                tracing::debug!(count = registry.len(), "session table snapshot");
            }
        })
    };

    // ── Wait for exit ────────────────────────────────────────────────────────

    let mut shutdown_rx = shutdown_tx.subscribe();

    tokio::select! {
        _ = shutdown_rx.recv()  => tracing::info!("shutting down"),
        r = sweeper_task        => tracing::error!("sweeper exited: {:?}", r),
        r = api_task            => tracing::error!("API server exited: {:?}", r),
        r = session_printer     => tracing::error!("session printer exited: {:?}", r),
    }

    Ok(())
}
