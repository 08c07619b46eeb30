// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Factory for watchers sharing one broker connection.

use crate::watcher::WorkspaceWatcher;
use nlw_adapters::BrokerAdapter;
use nlw_core::{Environment, WorkspaceId};

/// Creates [`WorkspaceWatcher`]s over a single shared connection.
///
/// Watchers never coordinate with each other: each one declares its own
/// exclusive, server-named queues.
#[derive(Clone)]
pub struct Messenger<B> {
    broker: B,
    environment: Environment,
}

impl<B: BrokerAdapter> Messenger<B> {
    pub fn new(broker: B, environment: Environment) -> Self {
        Self {
            broker,
            environment,
        }
    }

    pub fn broker(&self) -> &B {
        &self.broker
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Create an idle watcher for `id`.
    pub fn create_watcher(&self, id: impl Into<WorkspaceId>) -> WorkspaceWatcher<B> {
        WorkspaceWatcher::new(id.into(), self.environment.clone(), self.broker.clone())
    }
}

#[cfg(test)]
#[path = "messenger_tests.rs"]
mod tests;
