//! Configuration management for coad.
//!
//! Loads settings from /etc/coa/coad.toml or uses defaults, then applies
//! environment overrides (COAD_BIND, COAD_PORT, COAD_INTERVAL_MS).

use anyhow::{Context, Result};
use coa_shared::{DEFAULT_INTERVAL_MS, DEFAULT_PORT};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Config file path
pub const CONFIG_PATH: &str = "/etc/coa/coad.toml";

/// Default config file path for fallback
pub const DEFAULT_CONFIG_PATH: &str = "/var/lib/coa/coad.toml";

/// Shortest accepted broadcast interval
pub const MIN_INTERVAL_MS: u64 = 250;

/// Longest accepted broadcast interval
pub const MAX_INTERVAL_MS: u64 = 60_000;

/// Listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind (localhost only by default)
    #[serde(default = "default_bind")]
    pub bind: String,

    /// TCP port for HTTP and WebSocket traffic
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

/// Broadcast configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastConfig {
    /// Milliseconds between snapshots on one connection
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

fn default_interval_ms() -> u64 {
    DEFAULT_INTERVAL_MS
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

impl BroadcastConfig {
    /// Tick interval, out-of-range values fall back to the default
    pub fn interval(&self) -> Duration {
        if (MIN_INTERVAL_MS..=MAX_INTERVAL_MS).contains(&self.interval_ms) {
            Duration::from_millis(self.interval_ms)
        } else {
            warn!(
                "interval_ms={} outside {}..={}, using {}",
                self.interval_ms, MIN_INTERVAL_MS, MAX_INTERVAL_MS, DEFAULT_INTERVAL_MS
            );
            Duration::from_millis(DEFAULT_INTERVAL_MS)
        }
    }
}

/// Full daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub broadcast: BroadcastConfig,
}

impl Config {
    /// Load config from file (or defaults), then apply environment overrides
    pub fn load() -> Self {
        let mut config = Self::load_from_path(CONFIG_PATH)
            .or_else(|_| Self::load_from_path(DEFAULT_CONFIG_PATH))
            .unwrap_or_else(|e| {
                warn!("Config not found, using defaults: {}", e);
                Config::default()
            });
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Load config from specific path
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply overrides from a variable lookup (std::env in production)
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("COAD_BIND") {
            self.server.bind = bind;
        }

        if let Some(raw) = lookup("COAD_PORT") {
            match raw.parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(e) => warn!("Ignoring COAD_PORT={:?}: {}", raw, e),
            }
        }

        if let Some(raw) = lookup("COAD_INTERVAL_MS") {
            match raw.parse::<u64>() {
                Ok(ms) => self.broadcast.interval_ms = ms,
                Err(e) => warn!("Ignoring COAD_INTERVAL_MS={:?}: {}", raw, e),
            }
        }
    }

    /// Socket address to listen on
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.server.bind, self.server.port);
        addr.parse()
            .with_context(|| format!("Invalid listen address {}", addr))
    }
}
