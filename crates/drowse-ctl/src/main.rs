//! drowse-ctl — command-line interface for the drowse daemon.

mod cmd;

use anyhow::{Context, Result};

use cmd::{auth, detect, sessions, status};

const DEFAULT_PORT: u16 = 8000;

fn print_usage() {
    println!("Usage: drowse-ctl [--port <port>] <command>");
    println!();
    println!("Commands:");
    println!("  status                              Show daemon status and active sessions");
    println!("  ping                                Check the daemon is reachable");
    println!("  register <user> <email> <password>  Create an account");
    println!("  login <user> <password>             Log in and open a session");
    println!("  detect <session> [threshold]        Classify one sample");
    println!("  test-alert <session>                Raise a test alert");
    println!("  stats <session>                     Session time, frames, alerts");
    println!("  events <session>                    Recent event log, newest first");
    println!("  inspect <session>                   Full session details");
    println!("  logout <session>                    End a session");
    println!();
    println!("Options:");
    println!("  --port <port>   API port (default: {})", DEFAULT_PORT);
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    // Parse --port option
    let mut port = DEFAULT_PORT;
    let mut remaining: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--port" {
            i += 1;
            port = args
                .get(i)
                .context("--port requires a value")?
                .parse()
                .context("--port must be a number")?;
        } else {
            remaining.push(&args[i]);
        }
        i += 1;
    }

    match remaining.as_slice() {
        ["status"] | [] => status::cmd_status(port).await,
        ["ping"] => status::cmd_ping(port).await,
        ["register", user, email, password] => auth::cmd_register(port, user, email, password).await,
        ["login", user, password] => auth::cmd_login(port, user, password).await,
        ["detect", id] => detect::cmd_detect(port, id, None).await,
        ["detect", id, threshold] => {
            let t: f64 = threshold.parse().context("threshold must be a number")?;
            detect::cmd_detect(port, id, Some(t)).await
        }
        ["test-alert", id] => detect::cmd_test_alert(port, id).await,
        ["stats", id] => sessions::cmd_stats(port, id).await,
        ["events", id] => sessions::cmd_events(port, id).await,
        ["inspect", id] => sessions::cmd_inspect(port, id).await,
        ["logout", id] => sessions::cmd_logout(port, id).await,
        ["help"] | ["--help"] | ["-h"] => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other.join(" "));
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}
