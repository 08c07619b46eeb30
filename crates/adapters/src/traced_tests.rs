// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::broker::FakeBroker;
use serde_json::json;
use serial_test::serial;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run a test with captured tracing output
fn with_tracing<F, Fut>(f: F) -> (String, Fut::Output)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future,
{
    let logs = CapturedLogs::default();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs.clone())
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f())
    });

    (logs.contents(), result)
}

/// Assert that captured logs contain the expected substring
fn assert_log(logs: &str, label: &str, expected: &str) {
    assert!(logs.contains(expected), "Should log {label}. Logs:\n{logs}",);
}

#[test]
#[serial(tracing)]
fn traced_declare_queue_logs_assigned_name() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedBroker::new(FakeBroker::new());
        traced
            .declare_queue("", QueueOptions::exclusive())
            .await
    });

    assert_eq!(result.unwrap(), "amq.gen-1");
    assert_log(&logs, "span name", "broker.declare_queue");
    assert_log(&logs, "assigned name", "queue=\"amq.gen-1\"");
    assert_log(&logs, "exclusive flag", "exclusive=true");
}

#[test]
#[serial(tracing)]
fn traced_subscribe_logs_consumer_tag() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedBroker::new(FakeBroker::new());
        let queue = traced
            .declare_queue("", QueueOptions::exclusive())
            .await
            .unwrap();
        let (tx, _rx) = mpsc::channel(1);
        traced.subscribe(&queue, tx).await
    });

    let tag = result.unwrap();
    assert_log(&logs, "subscribe span", "broker.subscribe");
    assert_log(&logs, "consumer tag", &format!("consumer_tag={tag}"));
    assert_log(&logs, "elapsed", "elapsed_ms=");
}

#[test]
#[serial(tracing)]
fn traced_publish_logs_destination_and_reply_to() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedBroker::new(FakeBroker::new());
        traced
            .publish(
                "netlab.services.development.workspace.state",
                &json!({ "workspace": "abc" }),
                PublishOptions::reply_to("amq.gen-7"),
            )
            .await
    });

    assert!(result.is_ok());
    assert_log(
        &logs,
        "destination",
        "destination=\"netlab.services.development.workspace.state\"",
    );
    assert_log(&logs, "reply_to", "amq.gen-7");
}

#[test]
#[serial(tracing)]
fn traced_publish_logs_failure() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeBroker::new();
        fake.fail_on("publish");
        TracedBroker::new(fake)
            .publish("dest", &json!({}), PublishOptions::default())
            .await
    });

    assert!(result.is_err());
    assert_log(&logs, "publish failure", "publish failed");
    assert_log(&logs, "injected error", "injected publish failure");
}

#[test]
#[serial(tracing)]
fn traced_unsubscribe_unknown_tag_warns() {
    let (logs, result) = with_tracing(|| async {
        TracedBroker::new(FakeBroker::new())
            .unsubscribe(&ConsumerTag::new("ctag-missing"))
            .await
    });

    assert!(result.is_err());
    assert_log(&logs, "warn level", "WARN");
    assert_log(&logs, "unsubscribe failure", "unsubscribe failed");
}

#[test]
#[serial(tracing)]
fn traced_bind_and_exchange_log_names() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedBroker::new(FakeBroker::new());
        let exchange = "netlab.events.development.workspace.abc";
        traced
            .declare_exchange(exchange, ExchangeKind::Direct)
            .await
            .unwrap();
        let queue = traced
            .declare_queue("", QueueOptions::exclusive_auto_delete())
            .await
            .unwrap();
        traced
            .bind_queue(&queue, &BindTarget::Exchange(exchange.to_string()), "")
            .await
    });

    assert!(result.is_ok());
    assert_log(&logs, "exchange declared", "exchange declared");
    assert_log(&logs, "exchange kind", "kind=Direct");
    assert_log(&logs, "bound", "bound");
}

#[tokio::test]
async fn traced_broker_delegates_to_inner() {
    let fake = FakeBroker::new();
    let traced = TracedBroker::new(fake.clone());

    traced.declare_queue("q", QueueOptions::default()).await.unwrap();
    traced.close().await.unwrap();

    assert!(fake.is_closed());
    assert_eq!(fake.calls().len(), 2);
}
