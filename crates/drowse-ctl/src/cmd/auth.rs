//! Account commands: register, login.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::http::{base_url, post_json_body};

#[derive(Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

pub async fn cmd_register(port: u16, username: &str, email: &str, password: &str) -> Result<()> {
    #[derive(Deserialize)]
    struct RegisterResponse {
        username: String,
    }

    let resp: RegisterResponse = post_json_body(
        &format!("{}/register", base_url(port)),
        &RegisterRequest {
            username,
            email,
            password,
        },
    )
    .await?;

    println!("✓ Account created: {}", resp.username);
    Ok(())
}

pub async fn cmd_login(port: u16, username: &str, password: &str) -> Result<()> {
    #[derive(Deserialize)]
    struct LoginResponse {
        session_id: String,
        identity: String,
    }

    let resp: LoginResponse = post_json_body(
        &format!("{}/login", base_url(port)),
        &LoginRequest { username, password },
    )
    .await?;

    println!("✓ Logged in as {}", resp.identity);
    println!("  Session : {}", resp.session_id);
    Ok(())
}
