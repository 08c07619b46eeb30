// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Broker naming convention and the [`Environment`] newtype.
//!
//! Names must match the ones used by the workspace services exactly:
//!
//! ```text
//! netlab.services.<environment>.workspace.state       state-query destination
//! netlab.events.<environment>.workspace.<workspace>   per-workspace event exchange
//! ```

use crate::workspace::WorkspaceId;

/// Literal prefix shared by every service and event name.
pub const NAMESPACE: &str = "netlab";

/// Tier used when none is configured.
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// A deployment tier tag (e.g. `development`, `production`).
///
/// Wraps a `String` so tiers are not confused with workspace ids or queue
/// names at the type level.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Environment(String);

impl Environment {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self(DEFAULT_ENVIRONMENT.to_string())
    }
}

impl std::ops::Deref for Environment {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Environment {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Environment {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Routing key the workspace state service consumes queries from.
pub fn state_query_destination(env: &Environment) -> String {
    format!("{NAMESPACE}.services.{env}.workspace.state")
}

/// Direct exchange carrying lifecycle events for one workspace.
pub fn event_exchange_name(env: &Environment, workspace: &WorkspaceId) -> String {
    format!("{NAMESPACE}.events.{env}.workspace.{workspace}")
}

#[cfg(test)]
#[path = "naming_tests.rs"]
mod tests;
