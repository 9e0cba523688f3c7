//! Session commands: stats, events, inspect, logout.

use anyhow::Result;
use serde::Deserialize;

use super::http::{base_url, delete_json, get_json};

pub async fn cmd_stats(port: u16, session_id: &str) -> Result<()> {
    #[derive(Deserialize)]
    struct StatsResponse {
        elapsed_ms: u64,
        frame_count: u64,
        alert_count: u64,
    }

    let resp: StatsResponse =
        get_json(&format!("{}/sessions/{}/stats", base_url(port), session_id)).await?;

    let secs = resp.elapsed_ms / 1_000;
    println!("═══════════════════════════════════════");
    println!("  Session Stats");
    println!("═══════════════════════════════════════");
    println!("  Session time : {:02}:{:02}", secs / 60, secs % 60);
    println!("  Frames       : {}", resp.frame_count);
    println!("  Alerts       : {}", resp.alert_count);
    Ok(())
}

pub async fn cmd_events(port: u16, session_id: &str) -> Result<()> {
    #[derive(Deserialize)]
    struct Event {
        timestamp: u64,
        score: Option<f64>,
        is_alert: bool,
        message: String,
    }

    #[derive(Deserialize)]
    struct EventsResponse {
        events: Vec<Event>,
    }

    let resp: EventsResponse =
        get_json(&format!("{}/sessions/{}/events", base_url(port), session_id)).await?;

    if resp.events.is_empty() {
        println!("No events yet.");
        return Ok(());
    }

    for e in &resp.events {
        let marker = if e.is_alert { "⚠" } else { " " };
        let score = e
            .score
            .map(|s| format!("{:.2}", s))
            .unwrap_or_else(|| "  - ".to_string());
        println!("  {} {}  {}  {}", marker, e.timestamp, score, e.message);
    }
    Ok(())
}

pub async fn cmd_inspect(port: u16, session_id: &str) -> Result<()> {
    #[derive(Deserialize)]
    struct InspectResponse {
        session_id: String,
        identity: String,
        threshold: Option<f64>,
        alert_state: String,
        uptime_secs: u64,
        frame_count: u64,
        alert_count: u64,
        event_count: usize,
    }

    let resp: InspectResponse =
        get_json(&format!("{}/sessions/{}", base_url(port), session_id)).await?;

    println!("═══════════════════════════════════════");
    println!("  Session Details");
    println!("═══════════════════════════════════════");
    println!("  ID        : {}", resp.session_id);
    println!("  Identity  : {}", resp.identity);
    match resp.threshold {
        Some(t) => println!("  Threshold : {:.2}", t),
        None => println!("  Threshold : (none yet)"),
    }
    println!("  Alert     : {}", resp.alert_state);
    println!("  Uptime    : {}s", resp.uptime_secs);
    println!("  Frames    : {}", resp.frame_count);
    println!("  Alerts    : {}", resp.alert_count);
    println!("  Events    : {}", resp.event_count);
    Ok(())
}

pub async fn cmd_logout(port: u16, session_id: &str) -> Result<()> {
    #[derive(Deserialize)]
    struct DropResponse {
        session_id: String,
        removed: bool,
    }

    let resp: DropResponse =
        delete_json(&format!("{}/sessions/{}", base_url(port), session_id)).await?;

    if resp.removed {
        println!("✓ Logged out: {}...", &resp.session_id[..16]);
    } else {
        println!("Session not found: {}", session_id);
    }
    Ok(())
}
