// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the watcher engine

use nlw_adapters::BrokerError;
use thiserror::Error;

/// Errors returned while starting a watch
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("broker error: {0}")]
    Broker(#[from] BrokerError),
}
