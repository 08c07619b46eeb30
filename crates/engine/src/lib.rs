// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Workspace watcher engine

mod error;
mod messenger;
mod observer;
mod watcher;

#[cfg(test)]
mod test_helpers;

pub use error::WatchError;
pub use messenger::Messenger;
pub use observer::UpdateObserver;
pub use watcher::{WatcherStatus, WorkspaceWatcher};
