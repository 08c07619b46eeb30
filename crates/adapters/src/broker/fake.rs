// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake broker adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{
    BindTarget, BrokerAdapter, BrokerError, Delivery, ExchangeKind, PublishOptions, QueueOptions,
};
use async_trait::async_trait;
use nlw_core::ConsumerTag;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Recorded broker call
#[derive(Debug, Clone, PartialEq)]
pub enum BrokerCall {
    DeclareQueue {
        name: String,
        options: QueueOptions,
        assigned: String,
    },
    BindQueue {
        queue: String,
        target: BindTarget,
        routing_key: String,
    },
    UnbindQueue {
        queue: String,
        target: BindTarget,
        routing_key: String,
    },
    Subscribe {
        queue: String,
        tag: ConsumerTag,
    },
    Unsubscribe {
        tag: ConsumerTag,
    },
    DeclareExchange {
        name: String,
        kind: ExchangeKind,
    },
    Publish {
        destination: String,
        payload: Value,
        options: PublishOptions,
    },
    Close,
}

/// Fake queue state
#[derive(Debug, Clone)]
pub struct FakeQueue {
    pub name: String,
    pub options: QueueOptions,
    pub bindings: Vec<(BindTarget, String)>,
}

struct Subscription {
    queue: String,
    tx: mpsc::Sender<Delivery>,
}

struct FakeBrokerState {
    queues: HashMap<String, FakeQueue>,
    exchanges: HashMap<String, ExchangeKind>,
    subscriptions: HashMap<ConsumerTag, Subscription>,
    calls: Vec<BrokerCall>,
    failing: HashSet<String>,
    next_id: u64,
    closed: bool,
}

/// Fake broker adapter for testing
///
/// Queues, bindings and subscriptions are tracked in memory. Tests push
/// messages into subscribed queues with [`FakeBroker::deliver`] or fan them
/// out to every queue bound to a target with [`FakeBroker::deliver_bound`].
#[derive(Clone)]
pub struct FakeBroker {
    inner: Arc<Mutex<FakeBrokerState>>,
}

impl Default for FakeBroker {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeBrokerState {
                queues: HashMap::new(),
                exchanges: HashMap::new(),
                subscriptions: HashMap::new(),
                calls: Vec::new(),
                failing: HashSet::new(),
                next_id: 0,
                closed: false,
            })),
        }
    }
}

impl FakeBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<BrokerCall> {
        self.inner.lock().calls.clone()
    }

    /// Recorded publish calls as `(destination, payload, options)`
    pub fn published(&self) -> Vec<(String, Value, PublishOptions)> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                BrokerCall::Publish {
                    destination,
                    payload,
                    options,
                } => Some((destination.clone(), payload.clone(), options.clone())),
                _ => None,
            })
            .collect()
    }

    /// Get a declared queue by name
    pub fn queue(&self, name: &str) -> Option<FakeQueue> {
        self.inner.lock().queues.get(name).cloned()
    }

    /// Kind of a declared exchange
    pub fn exchange(&self, name: &str) -> Option<ExchangeKind> {
        self.inner.lock().exchanges.get(name).copied()
    }

    /// Queue consumed by an active subscription
    pub fn subscription_queue(&self, tag: &ConsumerTag) -> Option<String> {
        self.inner
            .lock()
            .subscriptions
            .get(tag)
            .map(|s| s.queue.clone())
    }

    /// Number of active subscriptions
    pub fn subscription_count(&self) -> usize {
        self.inner.lock().subscriptions.len()
    }

    /// Make every later call of the named operation fail (e.g. `"publish"`)
    pub fn fail_on(&self, op: &str) {
        self.inner.lock().failing.insert(op.to_string());
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Deliver a message to the consumer of `queue`.
    ///
    /// Returns `false` when nobody is subscribed to the queue.
    pub fn deliver(&self, queue: &str, payload: Value) -> bool {
        let inner = self.inner.lock();
        let Some((tag, sub)) = inner.subscriptions.iter().find(|(_, s)| s.queue == queue) else {
            return false;
        };
        sub.tx
            .try_send(Delivery {
                consumer_tag: tag.clone(),
                payload,
                reply_to: None,
            })
            .is_ok()
    }

    /// Deliver a message to every consumed queue bound to `target`.
    ///
    /// Returns how many subscriptions received it.
    pub fn deliver_bound(&self, target: &BindTarget, payload: Value) -> usize {
        let inner = self.inner.lock();
        let mut delivered = 0;
        for (tag, sub) in &inner.subscriptions {
            let bound = inner
                .queues
                .get(&sub.queue)
                .is_some_and(|q| q.bindings.iter().any(|(t, _)| t == target));
            if !bound {
                continue;
            }
            let sent = sub.tx.try_send(Delivery {
                consumer_tag: tag.clone(),
                payload: payload.clone(),
                reply_to: None,
            });
            if sent.is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    fn check(&self, op: &str) -> Result<(), String> {
        let inner = self.inner.lock();
        if inner.closed {
            return Err("connection closed".to_string());
        }
        if inner.failing.contains(op) {
            return Err(format!("injected {op} failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl BrokerAdapter for FakeBroker {
    async fn declare_queue(
        &self,
        name: &str,
        options: QueueOptions,
    ) -> Result<String, BrokerError> {
        self.check("declare_queue")
            .map_err(|reason| BrokerError::Declare {
                name: name.to_string(),
                reason,
            })?;
        let mut inner = self.inner.lock();
        let assigned = if name.is_empty() {
            inner.next_id += 1;
            format!("amq.gen-{}", inner.next_id)
        } else {
            name.to_string()
        };
        inner.queues.insert(
            assigned.clone(),
            FakeQueue {
                name: assigned.clone(),
                options,
                bindings: Vec::new(),
            },
        );
        inner.calls.push(BrokerCall::DeclareQueue {
            name: name.to_string(),
            options,
            assigned: assigned.clone(),
        });
        Ok(assigned)
    }

    async fn bind_queue(
        &self,
        queue: &str,
        target: &BindTarget,
        routing_key: &str,
    ) -> Result<(), BrokerError> {
        let bind_err = |reason| BrokerError::Bind {
            queue: queue.to_string(),
            reason,
        };
        self.check("bind_queue").map_err(bind_err)?;
        let mut inner = self.inner.lock();
        if let BindTarget::Exchange(name) = target {
            if !inner.exchanges.contains_key(name) {
                return Err(bind_err(format!("no exchange {name}")));
            }
        }
        let Some(q) = inner.queues.get_mut(queue) else {
            return Err(bind_err("no such queue".to_string()));
        };
        q.bindings.push((target.clone(), routing_key.to_string()));
        inner.calls.push(BrokerCall::BindQueue {
            queue: queue.to_string(),
            target: target.clone(),
            routing_key: routing_key.to_string(),
        });
        Ok(())
    }

    async fn unbind_queue(
        &self,
        queue: &str,
        target: &BindTarget,
        routing_key: &str,
    ) -> Result<(), BrokerError> {
        let bind_err = |reason| BrokerError::Bind {
            queue: queue.to_string(),
            reason,
        };
        self.check("unbind_queue").map_err(bind_err)?;
        let mut inner = self.inner.lock();
        let Some(q) = inner.queues.get_mut(queue) else {
            return Err(bind_err("no such queue".to_string()));
        };
        q.bindings
            .retain(|(t, key)| !(t == target && key == routing_key));
        inner.calls.push(BrokerCall::UnbindQueue {
            queue: queue.to_string(),
            target: target.clone(),
            routing_key: routing_key.to_string(),
        });
        Ok(())
    }

    async fn subscribe(
        &self,
        queue: &str,
        deliveries: mpsc::Sender<Delivery>,
    ) -> Result<ConsumerTag, BrokerError> {
        let sub_err = |reason| BrokerError::Subscribe {
            queue: queue.to_string(),
            reason,
        };
        self.check("subscribe").map_err(sub_err)?;
        let mut inner = self.inner.lock();
        if !inner.queues.contains_key(queue) {
            return Err(sub_err("no such queue".to_string()));
        }
        inner.next_id += 1;
        let tag = ConsumerTag::new(format!("ctag-{}", inner.next_id));
        inner.subscriptions.insert(
            tag.clone(),
            Subscription {
                queue: queue.to_string(),
                tx: deliveries,
            },
        );
        inner.calls.push(BrokerCall::Subscribe {
            queue: queue.to_string(),
            tag: tag.clone(),
        });
        Ok(tag)
    }

    async fn unsubscribe(&self, tag: &ConsumerTag) -> Result<(), BrokerError> {
        let unsub_err = |reason| BrokerError::Unsubscribe {
            tag: tag.clone(),
            reason,
        };
        self.check("unsubscribe").map_err(unsub_err)?;
        let mut inner = self.inner.lock();
        if inner.subscriptions.remove(tag).is_none() {
            return Err(unsub_err("unknown consumer tag".to_string()));
        }
        inner
            .calls
            .push(BrokerCall::Unsubscribe { tag: tag.clone() });
        Ok(())
    }

    async fn declare_exchange(&self, name: &str, kind: ExchangeKind) -> Result<(), BrokerError> {
        self.check("declare_exchange")
            .map_err(|reason| BrokerError::Declare {
                name: name.to_string(),
                reason,
            })?;
        let mut inner = self.inner.lock();
        inner.exchanges.insert(name.to_string(), kind);
        inner.calls.push(BrokerCall::DeclareExchange {
            name: name.to_string(),
            kind,
        });
        Ok(())
    }

    async fn publish(
        &self,
        destination: &str,
        payload: &Value,
        options: PublishOptions,
    ) -> Result<(), BrokerError> {
        self.check("publish").map_err(|reason| BrokerError::Publish {
            destination: destination.to_string(),
            reason,
        })?;
        self.inner.lock().calls.push(BrokerCall::Publish {
            destination: destination.to_string(),
            payload: payload.clone(),
            options,
        });
        Ok(())
    }

    async fn close(&self) -> Result<(), BrokerError> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Err(BrokerError::Closed);
        }
        inner.closed = true;
        inner.subscriptions.clear();
        inner.calls.push(BrokerCall::Close);
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
