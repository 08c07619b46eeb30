// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! netlab-watch daemon library
//!
//! Configuration loading and startup used by the `netlab-watch` binary.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod env;
pub mod lifecycle;

pub use config::{BrokerConfig, ConfigError};
pub use lifecycle::{Config, DaemonMessenger, LifecycleError};
