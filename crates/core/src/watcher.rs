// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Watcher lifecycle state and subscription roles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of a workspace watcher.
///
/// Only ever advances `Idle -> AwaitingState -> Listening`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatcherState {
    /// Constructed, `watch()` not yet called
    #[default]
    Idle,
    /// State query published, waiting for a matching successful reply
    AwaitingState,
    /// Subscribed to the workspace event exchange
    Listening,
}

impl WatcherState {
    /// Whether moving to `next` is a forward step of exactly one phase.
    pub fn can_advance_to(self, next: WatcherState) -> bool {
        matches!(
            (self, next),
            (WatcherState::Idle, WatcherState::AwaitingState)
                | (WatcherState::AwaitingState, WatcherState::Listening)
        )
    }
}

impl fmt::Display for WatcherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatcherState::Idle => write!(f, "idle"),
            WatcherState::AwaitingState => write!(f, "awaiting_state"),
            WatcherState::Listening => write!(f, "listening"),
        }
    }
}

/// Logical purpose of a watcher's subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionRole {
    /// Reply queue of the state query
    Get,
    /// Workspace event queue
    Listen,
}

impl SubscriptionRole {
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionRole::Get => "get",
            SubscriptionRole::Listen => "listen",
        }
    }
}

impl fmt::Display for SubscriptionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
