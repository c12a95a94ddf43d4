mod compare;
mod config;
mod error;
mod ipc;
mod page;
mod sorter;
mod table;

use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tablesortd")]
#[command(about = "Sortable table sidecar for gradebook pages")]
struct Cli {
    /// TOML file with marker vocabulary and sort profiles
    #[arg(long, env = "TABLESORTD_CONFIG")]
    config: Option<PathBuf>,
}

fn main() {
    // stdout carries the protocol; logs go to stderr.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => match config::load_config(path) {
            Ok(c) => c,
            Err(e) => {
                log::error!("{:#}", e);
                std::process::exit(2);
            }
        },
        None => config::Config::default(),
    };
    log::info!(
        "tablesortd {} ready ({} profiles)",
        env!("CARGO_PKG_VERSION"),
        config.profiles.len()
    );

    let mut state = ipc::AppState {
        config,
        config_path: cli.config,
        page: page::Page::default(),
    };

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
                log::warn!("dropping malformed request: {}", e);
                let resp = ipc::err("", "bad_json", e.to_string(), None);
                let _ = writeln!(stdout, "{}", resp);
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
