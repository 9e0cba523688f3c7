//! Daemon status and ping.

use anyhow::Result;
use serde::Deserialize;

use super::http::{base_url, get_json};

#[derive(Deserialize)]
struct StatusResponse {
    mode: String,
    default_threshold: f64,
    accounts: usize,
    sessions: Vec<SessionInfo>,
}

#[derive(Deserialize)]
struct SessionInfo {
    session_id: String,
    identity: String,
    alert_state: String,
    frame_count: u64,
    alert_count: u64,
    established_secs: u64,
}

pub async fn cmd_status(port: u16) -> Result<()> {
    let resp: StatusResponse = get_json(&format!("{}/status", base_url(port))).await?;

    println!("═══════════════════════════════════════");
    println!("  drowsed Status");
    println!("═══════════════════════════════════════");
    println!("  Mode             : {}", resp.mode);
    println!("  Default threshold: {:.2}", resp.default_threshold);
    println!("  Accounts         : {}", resp.accounts);
    println!("  Active sessions  : {}", resp.sessions.len());

    if resp.sessions.is_empty() {
        println!("\n  No active sessions.");
    } else {
        println!("\n  Sessions:");
        for s in &resp.sessions {
            println!("  ┌─ {}", &s.session_id[..16]);
            println!("  │  identity : {}", s.identity);
            println!("  │  alert    : {}", s.alert_state);
            println!("  │  frames   : {}", s.frame_count);
            println!("  │  alerts   : {}", s.alert_count);
            println!("  └─ uptime   : {}s", s.established_secs);
        }
    }

    Ok(())
}

pub async fn cmd_ping(port: u16) -> Result<()> {
    #[derive(Deserialize)]
    struct PingResponse {
        status: String,
    }

    let resp: PingResponse = get_json(&format!("{}/ping", base_url(port))).await?;
    println!("drowsed: {}", resp.status);
    Ok(())
}
