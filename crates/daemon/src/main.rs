// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! netlab-watch
//!
//! Watches workspace lifecycle state over the message broker: queries the
//! current state of each workspace, logs it, then logs every subsequent
//! workspace event until interrupted.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::path::PathBuf;

use clap::Parser;
use nlw_core::WorkspaceId;
use nlw_daemon::lifecycle::{self, Config};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    name = "netlab-watch",
    version,
    about = "Watch netlab workspace state over the message broker"
)]
struct Cli {
    /// Broker configuration file [env: NETLAB_CONFIG] [default: amqp.json]
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Deployment environment, overrides NETLAB_ENV and the config file
    #[arg(short, long, value_name = "ENV")]
    env: Option<String>,

    /// Workspaces to watch
    #[arg(required = true, value_name = "WORKSPACE")]
    workspaces: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(nlw_daemon::env::config_path);

    // Config errors are reported before logging exists
    let config = match Config::load(config_path, cli.env) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    let log_guard = lifecycle::setup_logging(config.broker.log_path.as_deref())?;

    info!(
        config = %config.config_path.display(),
        environment = %config.environment,
        "starting netlab-watch"
    );

    let messenger = match lifecycle::startup(&config).await {
        Ok(messenger) => messenger,
        Err(e) => {
            error!("failed to start: {}", e);
            eprintln!("error: {e}");
            drop(log_guard);
            std::process::exit(1);
        }
    };

    let workspaces: Vec<WorkspaceId> = cli.workspaces.into_iter().map(WorkspaceId::from).collect();
    let watchers = lifecycle::watch_all(&messenger, &workspaces).await;
    if watchers.is_empty() {
        error!("no watcher could be started");
        lifecycle::shutdown(&messenger).await;
        drop(log_guard);
        std::process::exit(1);
    }
    info!(count = watchers.len(), "watchers started");

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM"),
        _ = sigint.recv() => info!("received SIGINT"),
    }

    lifecycle::shutdown(&messenger).await;
    drop(watchers);
    drop(log_guard);
    Ok(())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
