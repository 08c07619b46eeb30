// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle: configuration, logging, connection bootstrap, shutdown.

use crate::config::{BrokerConfig, ConfigError};
use nlw_adapters::{AmqpBroker, BrokerAdapter, BrokerError, TracedBroker};
use nlw_core::{Environment, WorkspaceId};
use nlw_engine::{Messenger, WorkspaceWatcher};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info};

/// Messenger with the concrete adapter stack (wrapped with tracing)
pub type DaemonMessenger = Messenger<TracedBroker<AmqpBroker>>;

/// Errors during daemon startup
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("broker error: {0}")]
    Broker(#[from] BrokerError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid log path: {}", .0.display())]
    InvalidLogPath(PathBuf),
}

/// Resolved daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// File the broker settings were read from
    pub config_path: PathBuf,
    pub broker: BrokerConfig,
    /// Effective deployment tier
    pub environment: Environment,
}

impl Config {
    /// Read the broker configuration and resolve the environment.
    ///
    /// Environment precedence: `cli_env` > `NETLAB_ENV` > config file > default.
    pub fn load(config_path: PathBuf, cli_env: Option<String>) -> Result<Self, LifecycleError> {
        let broker = BrokerConfig::load(&config_path)?;
        let environment = pick_environment(cli_env, crate::env::environment_override(), &broker);
        Ok(Self {
            config_path,
            broker,
            environment,
        })
    }
}

fn pick_environment(
    cli_env: Option<String>,
    env_var: Option<String>,
    broker: &BrokerConfig,
) -> Environment {
    cli_env
        .or(env_var)
        .map(Environment::from)
        .unwrap_or_else(|| broker.environment.clone())
}

/// Install the global tracing subscriber.
///
/// Logs go to `log_path` when set, otherwise to stderr. The returned guard
/// must be held for the life of the process so buffered lines are flushed.
pub fn setup_logging(
    log_path: Option<&Path>,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (non_blocking, guard) = match log_path {
        Some(path) => {
            let invalid = || LifecycleError::InvalidLogPath(path.to_path_buf());
            let file = path.file_name().ok_or_else(invalid)?;
            let dir = match path.parent().ok_or_else(invalid)? {
                d if d.as_os_str().is_empty() => Path::new("."),
                d => d,
            };
            std::fs::create_dir_all(dir)?;
            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file))
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(log_path.is_none()))
        .init();

    Ok(guard)
}

/// Connect to the broker and build the messenger.
///
/// Called once logging is installed, so it also reports where the
/// configuration came from.
pub async fn startup(config: &Config) -> Result<DaemonMessenger, LifecycleError> {
    debug!(
        path = %config.config_path.display(),
        environment = %config.environment,
        "read broker configuration"
    );
    let uri = config.broker.amqp_uri()?;
    debug!(uri = %config.broker.redacted_uri(), "connecting to broker");
    let broker = AmqpBroker::connect(&uri).await?;
    info!(environment = %config.environment, "broker configured");
    Ok(Messenger::new(
        TracedBroker::new(broker),
        config.environment.clone(),
    ))
}

/// Create and start one watcher per workspace.
///
/// Every watcher logs its `updated` event. A watcher that fails to start is
/// logged and left out of the result.
pub async fn watch_all<B: BrokerAdapter>(
    messenger: &Messenger<B>,
    workspaces: &[WorkspaceId],
) -> Vec<WorkspaceWatcher<B>> {
    let mut watchers = Vec::with_capacity(workspaces.len());
    for id in workspaces {
        let watcher = messenger.create_watcher(id.clone());
        watcher.on_updated(|workspace: &WorkspaceId, nodes: &[Value]| {
            let listed = Value::Array(nodes.to_vec());
            info!(%workspace, count = nodes.len(), nodes = %listed, "workspace updated");
        });
        match watcher.watch().await {
            Ok(()) => watchers.push(watcher),
            Err(e) => error!(workspace = %id, error = %e, "failed to start watcher"),
        }
    }
    watchers
}

/// Close the broker connection on shutdown.
pub async fn shutdown<B: BrokerAdapter>(messenger: &Messenger<B>) {
    info!("shutting down");
    if let Err(e) = messenger.broker().close().await {
        error!(error = %e, "failed to close broker connection");
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
