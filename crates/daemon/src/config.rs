// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Broker configuration file.
//!
//! JSON, using the same keys as the services' broker settings:
//!
//! ```json
//! { "host": "rabbit.local", "port": 5672, "login": "guest", "password": "guest", "vhost": "/" }
//! ```
//!
//! `url` overrides the individual connection fields. `environment` selects the
//! deployment tier and `log_path` sends logs to a file instead of stderr.

use nlw_core::Environment;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Errors from loading the configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid broker uri: {0}")]
    Uri(String),
}

/// Replaces the password in logged URIs
const MASK: &str = "***";

/// Broker connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    pub login: String,
    pub password: String,
    pub vhost: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub environment: Environment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5672,
            login: "guest".to_string(),
            password: "guest".to_string(),
            vhost: "/".to_string(),
            url: None,
            environment: Environment::default(),
            log_path: None,
        }
    }
}

impl BrokerConfig {
    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &content)
    }

    fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Connection URI for the broker.
    ///
    /// `url` is used as given. Otherwise the URI is assembled from the
    /// individual fields, with the vhost as a single encoded path segment.
    pub fn amqp_uri(&self) -> Result<String, ConfigError> {
        match &self.url {
            Some(url) => Ok(url.clone()),
            None => self.broker_url(&self.password).map(String::from),
        }
    }

    /// The URI with the password masked, for logging.
    pub fn redacted_uri(&self) -> String {
        let masked = match &self.url {
            Some(url) => Url::parse(url)
                .map_err(|e| ConfigError::Uri(e.to_string()))
                .and_then(|mut url| {
                    if url.password().is_some() {
                        url.set_password(Some(MASK))
                            .map_err(|()| ConfigError::Uri("cannot mask password".to_string()))?;
                    }
                    Ok(url)
                }),
            None => self.broker_url(MASK),
        };
        masked
            .map(String::from)
            .unwrap_or_else(|_| "<invalid broker uri>".to_string())
    }

    fn broker_url(&self, password: &str) -> Result<Url, ConfigError> {
        let rejected = |field: &str| ConfigError::Uri(format!("invalid {field}"));

        let mut url = Url::parse("amqp://localhost/").map_err(|e| ConfigError::Uri(e.to_string()))?;
        match self.host.parse::<IpAddr>() {
            Ok(ip) => url.set_ip_host(ip).map_err(|()| rejected("host"))?,
            Err(_) => url
                .set_host(Some(&self.host))
                .map_err(|e| ConfigError::Uri(format!("invalid host {}: {e}", self.host)))?,
        }
        url.set_port(Some(self.port))
            .map_err(|()| rejected("port"))?;
        url.set_username(&self.login)
            .map_err(|()| rejected("login"))?;
        url.set_password(Some(password))
            .map_err(|()| rejected("password"))?;
        url.path_segments_mut()
            .map_err(|()| rejected("vhost"))?
            .clear()
            .push(&self.vhost);
        Ok(url)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
