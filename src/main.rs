mod attendance;
mod config;
mod conflict;
mod db;
mod ipc;
mod persist;
mod seed;
mod settings;
mod timetable;

use clap::Parser;
use std::io::{self, BufRead, Write};
use tracing::{error, info};

fn main() {
    let cfg = config::Config::parse();

    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "classroomd=info".into()),
        )
        .init();

    let mut state = ipc::AppState::new(cfg.seed_demo);
    if let Some(path) = cfg.workspace.as_deref() {
        // A bad startup workspace leaves the sidecar usable; the UI can select another.
        if let Err(e) = ipc::open_workspace(&mut state, path) {
            error!(path = %path.display(), error = ?e, "failed to open workspace");
        }
    }
    info!(version = env!("CARGO_PKG_VERSION"), "classroomd ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                let _ = writeln!(
                    stdout,
                    "{}",
                    serde_json::json!({
                        "ok": false,
                        "error": { "code": "bad_json", "message": e.to_string() }
                    })
                );
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
}
