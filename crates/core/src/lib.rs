// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! nlw-core: Protocol types for the netlab workspace watcher

pub mod id;
pub mod message;
pub mod naming;
pub mod watcher;
pub mod workspace;

pub use id::ConsumerTag;
pub use message::{classify_reply, ReplyOutcome, StateQuery, STATUS_SUCCESS};
pub use naming::{
    event_exchange_name, state_query_destination, Environment, DEFAULT_ENVIRONMENT, NAMESPACE,
};
pub use watcher::{SubscriptionRole, WatcherState};
pub use workspace::WorkspaceId;
