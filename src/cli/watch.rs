//! Watch command: the browser dashboard's poll loop in a terminal.
//!
//! Reads commands from stdin while the poller runs:
//! `r` refresh, `start <id>`, `stop <id>`, `interval <ms>`, `q` quit.

use crate::api::VpnAction;
use crate::cli::output::{format_report, format_toast};
use crate::cli::WatchArgs;
use crate::config::InstanceId;
use crate::dashboard::{DashboardClient, HistoryStore, Poller, PollerCommand, PollerEvent};
use anyhow::Context;
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const HELP: &str = "Commands: r (refresh), start <id>, stop <id>, interval <ms> (0 = off), q (quit)";

/// A parsed stdin line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchInput {
    Command(PollerCommand),
    Help,
    Quit,
}

/// Parse one stdin line. Blank lines parse to `None`.
pub fn parse_input(line: &str) -> Result<Option<WatchInput>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();
    if words.next().is_some() {
        return Err(format!("Too many arguments: {}", line.trim()));
    }

    let instance = |arg: Option<&str>| -> Result<InstanceId, String> {
        arg.ok_or_else(|| format!("Usage: {} <1|2>", verb))?.parse()
    };

    let input = match verb {
        "r" | "refresh" => WatchInput::Command(PollerCommand::Refresh),
        "start" => WatchInput::Command(PollerCommand::Action(instance(arg)?, VpnAction::Start)),
        "stop" => WatchInput::Command(PollerCommand::Action(instance(arg)?, VpnAction::Stop)),
        "interval" => {
            let ms: u64 = arg
                .ok_or("Usage: interval <ms>")?
                .parse()
                .map_err(|_| format!("Invalid interval: {}", arg.unwrap_or_default()))?;
            WatchInput::Command(PollerCommand::SetInterval(Duration::from_millis(ms)))
        }
        "h" | "help" | "?" => WatchInput::Help,
        "q" | "quit" | "exit" => WatchInput::Quit,
        other => return Err(format!("Unknown command: {}. {}", other, HELP)),
    };
    Ok(Some(input))
}

/// Read a saved history; a missing file is an empty history.
pub fn load_history(path: &Path) -> anyhow::Result<HistoryStore> {
    if !path.exists() {
        return Ok(HistoryStore::new());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read history file {}", path.display()))?;
    Ok(HistoryStore::restore(&raw))
}

pub fn save_history(path: &Path, history: &HistoryStore) -> anyhow::Result<()> {
    std::fs::write(path, history.to_json())
        .with_context(|| format!("Failed to write history file {}", path.display()))
}

/// Handle `gluetun-webui watch`.
pub async fn run_watch(args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let client = DashboardClient::new(&args.remote.url, args.remote.timeout())?;
    let history = match &args.history_file {
        Some(path) => load_history(path)?,
        None => HistoryStore::new(),
    };
    let poller = Arc::new(Poller::with_history(Arc::new(client), history));

    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let (event_tx, mut event_rx) = mpsc::channel(16);
    let cancel = CancellationToken::new();
    let task = tokio::spawn(Arc::clone(&poller).run(
        Duration::from_millis(args.interval),
        cmd_rx,
        event_tx,
        cancel.clone(),
    ));

    println!("Watching {}", args.remote.url.bold());
    println!("{}", HELP.dimmed());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            event = event_rx.recv() => match event {
                Some(PollerEvent::Report(report)) => {
                    println!("\n{}", format_report(&report));
                    if let Some(path) = &args.history_file {
                        if let Err(e) = save_history(path, &report.history) {
                            tracing::warn!(error = %format!("{:#}", e), "History not saved");
                        }
                    }
                }
                Some(PollerEvent::Toast(toast)) => println!("{}", format_toast(&toast)),
                None => break,
            },
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match parse_input(&line) {
                    Ok(Some(WatchInput::Command(command))) => {
                        if cmd_tx.send(command).await.is_err() {
                            break;
                        }
                    }
                    Ok(Some(WatchInput::Help)) => println!("{}", HELP),
                    Ok(Some(WatchInput::Quit)) => break,
                    Ok(None) => {}
                    Err(message) => eprintln!("{}", message.yellow()),
                },
                Ok(None) | Err(_) => stdin_open = false,
            },
            _ = &mut ctrl_c => break,
        }
    }

    cancel.cancel();
    task.await?;
    Ok(())
}
