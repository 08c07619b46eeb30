// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message broker adapters
//!
//! The [`BrokerAdapter`] trait is the whole surface the watcher needs from a
//! broker connection. One adapter value is shared (cloned) by every watcher
//! created over the same connection.

mod amqp;

pub use amqp::AmqpBroker;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{BrokerCall, FakeBroker, FakeQueue};

use async_trait::async_trait;
use nlw_core::ConsumerTag;
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from broker operations
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("connect failed: {0}")]
    Connect(String),
    #[error("declare failed for {name}: {reason}")]
    Declare { name: String, reason: String },
    #[error("bind failed for queue {queue}: {reason}")]
    Bind { queue: String, reason: String },
    #[error("subscribe failed for queue {queue}: {reason}")]
    Subscribe { queue: String, reason: String },
    #[error("unsubscribe failed for consumer {tag}: {reason}")]
    Unsubscribe { tag: ConsumerTag, reason: String },
    #[error("publish to {destination} failed: {reason}")]
    Publish { destination: String, reason: String },
    #[error("connection closed")]
    Closed,
}

/// Options for declaring a queue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueOptions {
    /// Usable only by this connection; removed by the broker on disconnect
    pub exclusive: bool,
    /// Removed by the broker once its last consumer goes away
    pub auto_delete: bool,
}

impl QueueOptions {
    pub fn exclusive() -> Self {
        Self {
            exclusive: true,
            auto_delete: false,
        }
    }

    pub fn exclusive_auto_delete() -> Self {
        Self {
            exclusive: true,
            auto_delete: true,
        }
    }
}

/// Exchange a queue binding refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BindTarget {
    /// The broker's default binding exchange
    Default,
    /// A named exchange
    Exchange(String),
}

impl fmt::Display for BindTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindTarget::Default => write!(f, "<default>"),
            BindTarget::Exchange(name) => f.write_str(name),
        }
    }
}

/// Routing type of an exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeKind {
    /// Routes on exact routing-key match; used for workspace event exchanges
    Direct,
}

/// Options attached to a published message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishOptions {
    /// Queue a responder should reply into
    pub reply_to: Option<String>,
}

impl PublishOptions {
    pub fn reply_to(queue: impl Into<String>) -> Self {
        Self {
            reply_to: Some(queue.into()),
        }
    }
}

/// A message delivered to a subscription
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    /// Subscription the message arrived on
    pub consumer_tag: ConsumerTag,
    /// Decoded JSON body
    pub payload: Value,
    pub reply_to: Option<String>,
}

/// Adapter for a message broker connection
#[async_trait]
pub trait BrokerAdapter: Clone + Send + Sync + 'static {
    /// Declare a queue and return its name.
    ///
    /// An empty `name` asks the broker to generate one.
    async fn declare_queue(&self, name: &str, options: QueueOptions)
        -> Result<String, BrokerError>;

    /// Bind a queue to an exchange with a routing key
    async fn bind_queue(
        &self,
        queue: &str,
        target: &BindTarget,
        routing_key: &str,
    ) -> Result<(), BrokerError>;

    /// Remove a binding created by [`BrokerAdapter::bind_queue`]
    async fn unbind_queue(
        &self,
        queue: &str,
        target: &BindTarget,
        routing_key: &str,
    ) -> Result<(), BrokerError>;

    /// Start consuming a queue.
    ///
    /// Every message is forwarded to `deliveries` in arrival order. Returns
    /// the consumer tag once the broker has acknowledged the subscription.
    async fn subscribe(
        &self,
        queue: &str,
        deliveries: mpsc::Sender<Delivery>,
    ) -> Result<ConsumerTag, BrokerError>;

    /// Cancel a subscription. No further messages reach its channel.
    async fn unsubscribe(&self, tag: &ConsumerTag) -> Result<(), BrokerError>;

    /// Declare an exchange
    async fn declare_exchange(&self, name: &str, kind: ExchangeKind) -> Result<(), BrokerError>;

    /// Publish a JSON message with `destination` as the routing key of the
    /// default exchange
    async fn publish(
        &self,
        destination: &str,
        payload: &Value,
        options: PublishOptions,
    ) -> Result<(), BrokerError>;

    /// Close the underlying connection.
    /// Default implementation is a no-op.
    async fn close(&self) -> Result<(), BrokerError> {
        Ok(())
    }
}
