// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrapper for consistent observability

use crate::broker::{
    BindTarget, BrokerAdapter, BrokerError, Delivery, ExchangeKind, PublishOptions, QueueOptions,
};
use async_trait::async_trait;
use nlw_core::ConsumerTag;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::Instrument;

/// Wrapper that adds tracing to any BrokerAdapter
#[derive(Clone)]
pub struct TracedBroker<B> {
    inner: B,
}

impl<B> TracedBroker<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<B: BrokerAdapter> BrokerAdapter for TracedBroker<B> {
    async fn declare_queue(
        &self,
        name: &str,
        options: QueueOptions,
    ) -> Result<String, BrokerError> {
        async {
            let result = self.inner.declare_queue(name, options).await;
            match &result {
                Ok(queue) => tracing::debug!(queue = queue.as_str(), "queue declared"),
                Err(e) => tracing::error!(error = %e, "declare failed"),
            }
            result
        }
        .instrument(tracing::debug_span!(
            "broker.declare_queue",
            requested = name,
            exclusive = options.exclusive,
            auto_delete = options.auto_delete
        ))
        .await
    }

    async fn bind_queue(
        &self,
        queue: &str,
        target: &BindTarget,
        routing_key: &str,
    ) -> Result<(), BrokerError> {
        let result = self.inner.bind_queue(queue, target, routing_key).await;
        match &result {
            Ok(()) => tracing::debug!(queue, exchange = %target, routing_key, "bound"),
            Err(e) => tracing::error!(queue, exchange = %target, error = %e, "bind failed"),
        }
        result
    }

    async fn unbind_queue(
        &self,
        queue: &str,
        target: &BindTarget,
        routing_key: &str,
    ) -> Result<(), BrokerError> {
        let result = self.inner.unbind_queue(queue, target, routing_key).await;
        match &result {
            Ok(()) => tracing::debug!(queue, exchange = %target, routing_key, "unbound"),
            Err(e) => tracing::warn!(queue, exchange = %target, error = %e, "unbind failed"),
        }
        result
    }

    async fn subscribe(
        &self,
        queue: &str,
        deliveries: mpsc::Sender<Delivery>,
    ) -> Result<ConsumerTag, BrokerError> {
        async {
            let start = std::time::Instant::now();
            let result = self.inner.subscribe(queue, deliveries).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(tag) => tracing::info!(consumer_tag = %tag, elapsed_ms, "subscribed"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "subscribe failed"),
            }
            result
        }
        .instrument(tracing::info_span!("broker.subscribe", queue))
        .await
    }

    async fn unsubscribe(&self, tag: &ConsumerTag) -> Result<(), BrokerError> {
        let result = self.inner.unsubscribe(tag).await;
        tracing::info_span!("broker.unsubscribe", consumer_tag = %tag).in_scope(|| match &result {
            Ok(()) => tracing::info!("unsubscribed"),
            Err(e) => tracing::warn!(error = %e, "unsubscribe failed"),
        });
        result
    }

    async fn declare_exchange(&self, name: &str, kind: ExchangeKind) -> Result<(), BrokerError> {
        let result = self.inner.declare_exchange(name, kind).await;
        match &result {
            Ok(()) => tracing::debug!(exchange = name, ?kind, "exchange declared"),
            Err(e) => tracing::error!(exchange = name, ?kind, error = %e, "exchange declare failed"),
        }
        result
    }

    async fn publish(
        &self,
        destination: &str,
        payload: &Value,
        options: PublishOptions,
    ) -> Result<(), BrokerError> {
        async {
            tracing::debug!(reply_to = ?options.reply_to, "publishing");
            let result = self.inner.publish(destination, payload, options).await;
            if let Err(ref e) = result {
                tracing::error!(error = %e, "publish failed");
            }
            result
        }
        .instrument(tracing::info_span!("broker.publish", destination))
        .await
    }

    async fn close(&self) -> Result<(), BrokerError> {
        let result = self.inner.close().await;
        match &result {
            Ok(()) => tracing::warn!("broker connection closed"),
            Err(e) => tracing::warn!(error = %e, "close failed"),
        }
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
