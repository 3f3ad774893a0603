//! Console trigger: one command per stdin line.
//!
//! Stdin is read on a dedicated thread so a blocked read never holds up
//! runtime shutdown.

use std::io::BufRead;
use std::sync::Arc;

use buildsync_core::{BuildSyncScheduler, RescanRequest};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

const HELP: &str = "Commands: r = rescan now, q = quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Rescan,
    Quit,
    Help,
}

pub fn parse_command(line: &str) -> ConsoleCommand {
    match line.trim().to_ascii_lowercase().as_str() {
        "r" | "rescan" => ConsoleCommand::Rescan,
        "q" | "quit" => ConsoleCommand::Quit,
        _ => ConsoleCommand::Help,
    }
}

/// Starts the stdin reader thread. The channel closes on EOF.
pub fn spawn_reader() -> std::io::Result<mpsc::Receiver<ConsoleCommand>> {
    let (tx, rx) = mpsc::channel(4);
    std::thread::Builder::new()
        .name("console".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                if tx.blocking_send(parse_command(&line)).is_err() {
                    break;
                }
            }
            debug!("Console input closed");
        })?;
    Ok(rx)
}

/// Handles console commands until input closes or quit is requested.
pub async fn run(
    scheduler: Arc<BuildSyncScheduler>,
    mut commands: mpsc::Receiver<ConsoleCommand>,
    quit_tx: watch::Sender<bool>,
) {
    println!("{}", HELP);
    while let Some(command) = commands.recv().await {
        match command {
            ConsoleCommand::Rescan => match scheduler.request_rescan() {
                RescanRequest::Queued => info!("Rescan requested from console"),
                RescanRequest::AlreadyQueued => info!("Rescan already queued"),
                RescanRequest::NotRunning => warn!("Scheduler is not running"),
            },
            ConsoleCommand::Quit => {
                info!("Quit requested from console");
                let _ = quit_tx.send(true);
                return;
            }
            ConsoleCommand::Help => println!("{}", HELP),
        }
    }
}
