// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire payloads for the workspace state protocol and reply classification.
//!
//! Payloads are JSON objects. Replies are read field by field; node entries
//! and listening-phase events stay as raw [`serde_json::Value`].

use crate::workspace::WorkspaceId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status value the state service uses for a successful query.
pub const STATUS_SUCCESS: &str = "success";

/// Request for the current state of a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateQuery {
    pub workspace: WorkspaceId,
}

impl StateQuery {
    pub fn new(workspace: WorkspaceId) -> Self {
        Self { workspace }
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({ "workspace": self.workspace })
    }
}

/// What the query phase should do with one reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyOutcome {
    /// Matching workspace, success status: emit `updated` and start listening.
    Accepted { nodes: Vec<Value> },
    /// Reply addressed to another workspace.
    Mismatch { received: WorkspaceId },
    /// Matching workspace but the service reported a failure.
    Failed { cause: Option<String> },
    /// Payload is not a state reply at all.
    Malformed { reason: String },
}

impl ReplyOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ReplyOutcome::Accepted { .. })
    }
}

/// Decide how a reply affects a watcher waiting on `expected`.
///
/// Only `workspace` and `status` decide the outcome. The workspace check comes
/// first: the reply queue may receive replies meant for other watchers, so
/// their status is irrelevant here. `cause` is read as text whatever its JSON
/// type and `nodes` is read only once the reply is accepted.
pub fn classify_reply(expected: &WorkspaceId, payload: &Value) -> ReplyOutcome {
    let Some(fields) = payload.as_object() else {
        return ReplyOutcome::Malformed {
            reason: "reply is not a JSON object".to_string(),
        };
    };
    let Some(workspace) = fields.get("workspace").and_then(Value::as_str) else {
        return ReplyOutcome::Malformed {
            reason: "reply has no workspace id".to_string(),
        };
    };

    if workspace != expected.as_str() {
        return ReplyOutcome::Mismatch {
            received: WorkspaceId::new(workspace),
        };
    }
    if fields.get("status").and_then(Value::as_str) != Some(STATUS_SUCCESS) {
        return ReplyOutcome::Failed {
            cause: fields.get("cause").and_then(cause_text),
        };
    }

    match fields.get("nodes") {
        None | Some(Value::Null) => ReplyOutcome::Accepted { nodes: Vec::new() },
        Some(Value::Array(nodes)) => ReplyOutcome::Accepted {
            nodes: nodes.clone(),
        },
        Some(other) => ReplyOutcome::Malformed {
            reason: format!("nodes is not a list: {other}"),
        },
    }
}

fn cause_text(cause: &Value) -> Option<String> {
    match cause {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
