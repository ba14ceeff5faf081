// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Server configuration.
//!
//! Supports both programmatic and file-based configuration. The listener
//! always binds every interface; only the port is configurable.
//!
//! ```toml
//! port = 8080
//! route_set = "full"   # or "minimal"
//! shutdown_grace_ms = 5000
//! cors = false
//! ```

use crate::routes::RouteSet;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8080;

const MAX_SHUTDOWN_GRACE_MS: u64 = 600_000;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// REST server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// TCP port (0 picks an ephemeral port).
    #[serde(default = "default_port")]
    pub port: u16,

    /// API surface to expose.
    #[serde(default)]
    pub route_set: RouteSet,

    /// How long in-flight requests may run after a stop request.
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,

    /// Allow cross-origin requests from any origin.
    #[serde(default)]
    pub cors: bool,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_shutdown_grace_ms() -> u64 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            route_set: RouteSet::default(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
            cors: false,
        }
    }
}

impl ServerConfig {
    /// Default configuration on another port.
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shutdown_grace_ms > MAX_SHUTDOWN_GRACE_MS {
            return Err(ConfigError::Invalid(format!(
                "shutdown_grace_ms {} exceeds {}",
                self.shutdown_grace_ms, MAX_SHUTDOWN_GRACE_MS
            )));
        }
        Ok(())
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    /// Serialize to TOML (used for generating example files).
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}
