// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace watcher state machine
//!
//! A watcher asks the workspace state service for the current state of one
//! workspace, waits for a matching successful reply, reports its nodes to the
//! registered observers, then listens on the workspace's event exchange.
//!
//! ```text
//! Idle ──watch()──▶ AwaitingState ──valid reply──▶ Listening
//!                     │   ▲
//!                     └───┘ mismatched or failed replies are logged and ignored
//! ```
//!
//! The query phase has no timeout: without a valid reply the watcher stays in
//! `AwaitingState`.

use crate::error::WatchError;
use crate::observer::{Observers, UpdateObserver};
use nlw_adapters::{BindTarget, BrokerAdapter, Delivery, ExchangeKind, PublishOptions, QueueOptions};
use nlw_core::{
    classify_reply, event_exchange_name, state_query_destination, ConsumerTag, Environment,
    ReplyOutcome, StateQuery, SubscriptionRole, WatcherState, WorkspaceId,
};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Buffered deliveries per subscription before the broker consumer waits
const DELIVERY_BUFFER: usize = 64;

/// Point-in-time view of a watcher's progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatcherStatus {
    pub state: WatcherState,
    /// Replies taken off the reply queue, valid or not
    pub replies_handled: u64,
    /// Messages received on the event queue
    pub events_received: u64,
}

/// Broker resources owned by one watcher.
#[derive(Default)]
struct Resources {
    consumer_tags: HashMap<SubscriptionRole, ConsumerTag>,
    reply_queue: Option<String>,
    event_exchange: Option<String>,
    event_queue: Option<String>,
}

struct Shared<B> {
    id: WorkspaceId,
    environment: Environment,
    broker: B,
    resources: Mutex<Resources>,
    observers: Observers,
    status: watch::Sender<WatcherStatus>,
}

/// Watches the lifecycle of a single workspace.
///
/// Cloning yields another handle to the same watcher.
pub struct WorkspaceWatcher<B> {
    shared: Arc<Shared<B>>,
}

impl<B> Clone for WorkspaceWatcher<B> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<B: BrokerAdapter> WorkspaceWatcher<B> {
    pub fn new(id: WorkspaceId, environment: Environment, broker: B) -> Self {
        let (status, _) = watch::channel(WatcherStatus::default());
        Self {
            shared: Arc::new(Shared {
                id,
                environment,
                broker,
                resources: Mutex::new(Resources::default()),
                observers: Observers::default(),
                status,
            }),
        }
    }

    pub fn id(&self) -> &WorkspaceId {
        &self.shared.id
    }

    pub fn environment(&self) -> &Environment {
        &self.shared.environment
    }

    pub fn state(&self) -> WatcherState {
        self.shared.status.borrow().state
    }

    pub fn status(&self) -> WatcherStatus {
        *self.shared.status.borrow()
    }

    /// Receiver that observes every status change.
    pub fn status_changes(&self) -> watch::Receiver<WatcherStatus> {
        self.shared.status.subscribe()
    }

    /// Consumer tag of the active subscription for `role`, if any.
    pub fn consumer_tag(&self, role: SubscriptionRole) -> Option<ConsumerTag> {
        self.shared.resources.lock().consumer_tags.get(&role).cloned()
    }

    pub fn reply_queue(&self) -> Option<String> {
        self.shared.resources.lock().reply_queue.clone()
    }

    pub fn event_exchange(&self) -> Option<String> {
        self.shared.resources.lock().event_exchange.clone()
    }

    pub fn event_queue(&self) -> Option<String> {
        self.shared.resources.lock().event_queue.clone()
    }

    /// Register a handler for `updated(nodes)`.
    ///
    /// Handlers registered after the update has fired are not called.
    pub fn on_updated(&self, observer: impl UpdateObserver) {
        self.shared.observers.add(Arc::new(observer));
    }

    /// Start watching the workspace.
    ///
    /// Sets up the reply subscription and publishes the state query, then
    /// returns; the reply is handled by a background task. Calling this on a
    /// watcher that is already watching does nothing.
    ///
    /// On error the watcher does not return to `Idle`.
    pub async fn watch(&self) -> Result<(), WatchError> {
        let shared = &self.shared;
        if !shared.advance(WatcherState::AwaitingState) {
            tracing::debug!(workspace = %shared.id, state = %self.state(), "already watching");
            return Ok(());
        }

        let (tx, replies) = mpsc::channel(DELIVERY_BUFFER);
        let queue = shared
            .broker
            .declare_queue("", QueueOptions::exclusive())
            .await?;
        shared.resources.lock().reply_queue = Some(queue.clone());
        shared
            .broker
            .bind_queue(&queue, &BindTarget::Default, "")
            .await?;
        let tag = shared.broker.subscribe(&queue, tx).await?;
        shared
            .resources
            .lock()
            .consumer_tags
            .insert(SubscriptionRole::Get, tag.clone());

        let destination = state_query_destination(&shared.environment);
        let query = StateQuery::new(shared.id.clone()).to_value();
        if let Err(e) = shared
            .broker
            .publish(&destination, &query, PublishOptions::reply_to(queue.as_str()))
            .await
        {
            shared.cancel_get(&tag).await;
            return Err(e.into());
        }
        tracing::info!(
            workspace = %shared.id,
            %destination,
            reply_queue = %queue,
            observers = shared.observers.len(),
            "state query sent"
        );

        tokio::spawn(run(Arc::clone(shared), replies));
        Ok(())
    }
}

impl<B: BrokerAdapter> Shared<B> {
    /// Move to `next` if it is the following phase. Returns whether it moved.
    fn advance(&self, next: WatcherState) -> bool {
        self.status.send_if_modified(|status| {
            if status.state.can_advance_to(next) {
                status.state = next;
                true
            } else {
                false
            }
        })
    }

    /// Apply the reply policy to one reply. Returns the nodes when the reply
    /// completes the query.
    fn handle_reply(&self, payload: &Value) -> Option<Vec<Value>> {
        let outcome = classify_reply(&self.id, payload);
        self.status.send_modify(|status| status.replies_handled += 1);
        match outcome {
            ReplyOutcome::Accepted { nodes } => Some(nodes),
            ReplyOutcome::Mismatch { received } => {
                tracing::error!(workspace = %self.id, %received, "received invalid workspace id");
                None
            }
            ReplyOutcome::Failed { cause } => {
                tracing::error!(
                    workspace = %self.id,
                    cause = cause.as_deref().unwrap_or("unknown"),
                    "workspace state query failed"
                );
                None
            }
            ReplyOutcome::Malformed { reason } => {
                tracing::error!(workspace = %self.id, %reason, "malformed state reply");
                None
            }
        }
    }

    /// Unsubscribe the reply consumer after a failed query setup.
    async fn cancel_get(&self, tag: &ConsumerTag) {
        self.resources
            .lock()
            .consumer_tags
            .remove(&SubscriptionRole::Get);
        if let Err(e) = self.broker.unsubscribe(tag).await {
            tracing::warn!(workspace = %self.id, error = %e, "failed to cancel reply subscription");
        }
    }

    /// Unbind and unsubscribe the reply queue using the tag stored at
    /// subscribe time.
    async fn finish_query(&self) {
        let (queue, tag) = {
            let mut resources = self.resources.lock();
            (
                resources.reply_queue.clone(),
                resources.consumer_tags.remove(&SubscriptionRole::Get),
            )
        };
        if let Some(queue) = queue {
            if let Err(e) = self
                .broker
                .unbind_queue(&queue, &BindTarget::Default, "")
                .await
            {
                tracing::warn!(workspace = %self.id, error = %e, "failed to unbind reply queue");
            }
        }
        match tag {
            Some(tag) => {
                if let Err(e) = self.broker.unsubscribe(&tag).await {
                    tracing::warn!(workspace = %self.id, error = %e, "failed to unsubscribe reply queue");
                }
            }
            None => tracing::error!(workspace = %self.id, "no reply consumer tag to cancel"),
        }
    }

    /// Enter the listening phase: declare the event exchange and an exclusive
    /// auto-delete queue bound to it, then subscribe.
    async fn listen(&self) -> Result<mpsc::Receiver<Delivery>, WatchError> {
        let exchange = event_exchange_name(&self.environment, &self.id);
        tracing::warn!(workspace = %self.id, %exchange, "listening for workspace events");

        self.broker
            .declare_exchange(&exchange, ExchangeKind::Direct)
            .await?;
        self.resources.lock().event_exchange = Some(exchange.clone());

        let queue = self
            .broker
            .declare_queue("", QueueOptions::exclusive_auto_delete())
            .await?;
        self.resources.lock().event_queue = Some(queue.clone());

        self.broker
            .bind_queue(&queue, &BindTarget::Exchange(exchange), "")
            .await?;

        let (tx, events) = mpsc::channel(DELIVERY_BUFFER);
        let tag = self.broker.subscribe(&queue, tx).await?;
        self.resources
            .lock()
            .consumer_tags
            .insert(SubscriptionRole::Listen, tag);
        Ok(events)
    }
}

/// Background task driving a watcher after its state query is published.
async fn run<B: BrokerAdapter>(shared: Arc<Shared<B>>, mut replies: mpsc::Receiver<Delivery>) {
    let nodes = loop {
        let Some(delivery) = replies.recv().await else {
            tracing::debug!(workspace = %shared.id, "reply subscription ended without a valid reply");
            return;
        };
        if let Some(nodes) = shared.handle_reply(&delivery.payload) {
            break nodes;
        }
    };
    // Anything still buffered on the reply queue is never processed
    drop(replies);

    tracing::info!(workspace = %shared.id, nodes = nodes.len(), "workspace state received");
    shared.observers.emit_updated(&shared.id, &nodes);
    shared.finish_query().await;
    shared.advance(WatcherState::Listening);

    let mut events = match shared.listen().await {
        Ok(events) => events,
        Err(e) => {
            tracing::error!(workspace = %shared.id, error = %e, "failed to listen for workspace events");
            return;
        }
    };
    while let Some(delivery) = events.recv().await {
        shared
            .status
            .send_modify(|status| status.events_received += 1);
        tracing::info!(
            workspace = %shared.id,
            consumer_tag = %delivery.consumer_tag,
            payload = %delivery.payload,
            "workspace event"
        );
    }
    tracing::debug!(workspace = %shared.id, "event subscription ended");
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
