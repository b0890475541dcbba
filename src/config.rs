//! # Configuration Management
//!
//! Centralized configuration for the reactor.
//!
//! This module provides structured configuration for the listener and the
//! per-connection socket options, plus logging settings.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()` / `from_toml()`
//! - Direct instantiation with defaults
//! - `default_with_overrides()` for programmatic tweaks
//!
//! Every socket option is optional; unset keys leave the transport defaults
//! unchanged.

use crate::error::{ReactorError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::Level;

/// Main configuration structure containing all configurable settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ReactorConfig {
    /// Listener-specific configuration
    #[serde(default)]
    pub listener: ListenerConfig,

    /// Per-connection socket options
    #[serde(default)]
    pub socket: SocketConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ReactorConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| ReactorError::Config(format!("failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ReactorError::Config(format!("failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| ReactorError::Config(format!("failed to parse TOML: {e}")))
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Validate the configuration for common issues and misconfigurations.
    ///
    /// Returns a list of validation errors. Empty list means the
    /// configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.listener.validate());
        errors.extend(self.socket.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ReactorError::Config(format!(
                "configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Listener configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenerConfig {
    /// Listen address (e.g., "127.0.0.1:9000")
    pub address: String,

    /// Accept backlog; transport default when unset
    pub backlog: Option<u32>,

    /// SO_REUSEADDR on the listening socket; transport default when unset
    pub reuse_address: Option<bool>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            address: String::from("127.0.0.1:9000"),
            backlog: None,
            reuse_address: None,
        }
    }
}

impl ListenerConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.address.is_empty() {
            errors.push("listener address cannot be empty".to_string());
        } else if self.address.parse::<std::net::SocketAddr>().is_err() {
            errors.push(format!(
                "invalid listener address format: '{}' (expected format: '0.0.0.0:8080')",
                self.address
            ));
        }

        if let Some(backlog) = self.backlog {
            if backlog == 0 {
                errors.push("backlog must be greater than 0".to_string());
            }
        }

        errors
    }
}

/// Per-connection socket options. Each option is applied only when set.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct SocketConfig {
    /// SO_RCVBUF, also the per-connection receive staging buffer size
    pub receive_buffer_size: Option<u32>,

    /// SO_SNDBUF
    pub send_buffer_size: Option<u32>,

    /// TCP_NODELAY on accepted connections
    pub tcp_nodelay: Option<bool>,

    /// SO_KEEPALIVE on accepted connections
    pub keep_alive: Option<bool>,

    /// SO_LINGER policy: `true` lingers 10s on close, `false` closes
    /// abortively (linger 0), unset leaves the transport default
    pub linger: Option<bool>,
}

impl SocketConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if let Some(size) = self.receive_buffer_size {
            if size == 0 {
                errors.push("receive buffer size must be greater than 0".to_string());
            } else if size > 64 * 1024 * 1024 {
                errors.push(format!(
                    "receive buffer size very large: {size} bytes (maximum recommended: 64 MB)"
                ));
            }
        }

        if let Some(size) = self.send_buffer_size {
            if size == 0 {
                errors.push("send buffer size must be greater than 0".to_string());
            }
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: Level::INFO,
            json_format: false,
        }
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("invalid log level: {level_str}")))
    }
}
