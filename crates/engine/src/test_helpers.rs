// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for the engine crate.

use crate::{Messenger, WatcherStatus, WorkspaceWatcher};
use nlw_adapters::FakeBroker;
use nlw_core::{Environment, WorkspaceId};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// Upper bound for any wait on the background task.
const WAIT_MAX: Duration = Duration::from_secs(2);

/// Updates recorded by [`record_updates`], as `(workspace, nodes)`.
pub(crate) type Updates = Arc<Mutex<Vec<(WorkspaceId, Vec<Value>)>>>;

/// Watcher over a fresh fake broker with an update recorder attached.
pub(crate) struct TestContext {
    pub broker: FakeBroker,
    pub watcher: WorkspaceWatcher<FakeBroker>,
    pub updates: Updates,
}

pub(crate) fn setup(id: &str) -> TestContext {
    let broker = FakeBroker::new();
    let messenger = Messenger::new(broker.clone(), Environment::default());
    let watcher = messenger.create_watcher(id);
    let updates = record_updates(&watcher);
    TestContext {
        broker,
        watcher,
        updates,
    }
}

/// Attach an observer that records every `updated` call.
pub(crate) fn record_updates(watcher: &WorkspaceWatcher<FakeBroker>) -> Updates {
    let updates: Updates = Arc::default();
    let sink = Arc::clone(&updates);
    watcher.on_updated(move |ws: &WorkspaceId, nodes: &[Value]| {
        sink.lock().push((ws.clone(), nodes.to_vec()));
    });
    updates
}

/// Build a state reply payload.
pub(crate) fn reply(workspace: &str, status: &str, nodes: Value) -> Value {
    json!({ "workspace": workspace, "status": status, "nodes": nodes })
}

/// Wait until the watcher's status satisfies `pred`, panicking after [`WAIT_MAX`].
pub(crate) async fn wait_status<F>(watcher: &WorkspaceWatcher<FakeBroker>, pred: F) -> WatcherStatus
where
    F: FnMut(&WatcherStatus) -> bool,
{
    let mut rx = watcher.status_changes();
    let status = tokio::time::timeout(WAIT_MAX, rx.wait_for(pred))
        .await
        .expect("timed out waiting for watcher status")
        .expect("watcher status channel closed");
    *status
}

/// Deliver a payload to the watcher's reply queue.
pub(crate) fn deliver_reply(ctx: &TestContext, payload: Value) -> bool {
    let queue = ctx.watcher.reply_queue().expect("reply queue declared");
    ctx.broker.deliver(&queue, payload)
}
