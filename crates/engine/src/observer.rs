// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Observer registry for watcher events.

use nlw_core::WorkspaceId;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;

/// Receives the node list of a workspace once its state query completes.
pub trait UpdateObserver: Send + Sync + 'static {
    fn updated(&self, workspace: &WorkspaceId, nodes: &[Value]);
}

impl<F> UpdateObserver for F
where
    F: Fn(&WorkspaceId, &[Value]) + Send + Sync + 'static,
{
    fn updated(&self, workspace: &WorkspaceId, nodes: &[Value]) {
        self(workspace, nodes)
    }
}

/// Registered observers, notified in registration order.
#[derive(Clone, Default)]
pub(crate) struct Observers {
    handlers: Arc<Mutex<Vec<Arc<dyn UpdateObserver>>>>,
}

impl Observers {
    pub(crate) fn add(&self, observer: Arc<dyn UpdateObserver>) {
        self.handlers.lock().push(observer);
    }

    pub(crate) fn len(&self) -> usize {
        self.handlers.lock().len()
    }

    pub(crate) fn emit_updated(&self, workspace: &WorkspaceId, nodes: &[Value]) {
        // Snapshot so handlers may register further observers
        let handlers = self.handlers.lock().clone();
        for handler in handlers {
            handler.updated(workspace, nodes);
        }
    }
}

#[cfg(test)]
#[path = "observer_tests.rs"]
mod tests;
