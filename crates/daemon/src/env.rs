// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;

/// Configuration file used when none is given on the command line.
pub const DEFAULT_CONFIG_FILE: &str = "amqp.json";

/// Resolve config path: NETLAB_CONFIG > ./amqp.json
pub fn config_path() -> PathBuf {
    std::env::var("NETLAB_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Deployment tier override
pub fn environment_override() -> Option<String> {
    std::env::var("NETLAB_ENV").ok().filter(|s| !s.is_empty())
}
