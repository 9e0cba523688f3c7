//! Detection commands: detect, test-alert.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::http::{base_url, post_json, post_json_body};

#[derive(Serialize)]
struct DetectRequest<'a> {
    session_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    threshold: Option<f64>,
}

#[derive(Deserialize)]
struct DetectResponse {
    alert_state: String,
    ear: f64,
    is_drowsy: bool,
    frame_count: u64,
    alert_count: u64,
    alert_raised: bool,
    mode: String,
}

pub async fn cmd_detect(port: u16, session_id: &str, threshold: Option<f64>) -> Result<()> {
    let resp: DetectResponse = post_json_body(
        &format!("{}/detect", base_url(port)),
        &DetectRequest {
            session_id,
            threshold,
        },
    )
    .await?;

    let eyes = if resp.is_drowsy { "CLOSED" } else { "OPEN" };
    println!("  EAR    : {:.2} ({})", resp.ear, resp.mode);
    println!("  Eyes   : {}", eyes);
    println!("  Alert  : {}", resp.alert_state);
    println!("  Frames : {}", resp.frame_count);
    println!("  Alerts : {}", resp.alert_count);
    if resp.alert_raised {
        println!("\n  ⚠ DROWSINESS DETECTED");
    }
    Ok(())
}

pub async fn cmd_test_alert(port: u16, session_id: &str) -> Result<()> {
    #[derive(Deserialize)]
    struct TestAlertResponse {
        raised: bool,
        alert_count: u64,
    }

    let resp: TestAlertResponse = post_json(&format!(
        "{}/sessions/{}/test-alert",
        base_url(port),
        session_id
    ))
    .await?;

    if resp.raised {
        println!("⚠ Test alert raised (alerts: {})", resp.alert_count);
    } else {
        println!("Alert already active (alerts: {})", resp.alert_count);
    }
    Ok(())
}
