//! Client configuration.
//!
//! Read from `$XDG_CONFIG_HOME/coa/coactl.toml` when present; every key is
//! optional. `COA_SERVER_URL` overrides the server address.

use crate::assistant::AssistantConfig;
use crate::stream::ReconnectPolicy;
use anyhow::{Context, Result};
use coa_shared::notification::Recipient;
use coa_shared::DEFAULT_PORT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Shortest wait before reconnecting; zero would spin on a dead server
pub const MIN_RECONNECT_DELAY_SECS: u64 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// WebSocket endpoint of coad
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Pause after a closed stream before reconnecting
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_secs: u64,

    /// Who gets simulated deliveries for raised notifications
    #[serde(default)]
    pub recipients: Vec<Recipient>,

    #[serde(default)]
    pub assistant: AssistantConfig,
}

fn default_server_url() -> String {
    format!("ws://127.0.0.1:{}/", DEFAULT_PORT)
}

fn default_reconnect_delay() -> u64 {
    5
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            reconnect_delay_secs: default_reconnect_delay(),
            recipients: Vec::new(),
            assistant: AssistantConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Config file location, `None` when the platform has no config dir
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("coa").join("coactl.toml"))
    }

    /// Load the user's config (or defaults), then apply the environment
    pub fn load() -> Self {
        let mut config = match Self::path() {
            Some(path) if path.exists() => Self::load_from_path(&path).unwrap_or_else(|e| {
                warn!("{:#}, using defaults", e);
                Self::default()
            }),
            _ => {
                debug!("No client config file, using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("COA_SERVER_URL").filter(|u| !u.trim().is_empty()) {
            self.server_url = url;
        }
    }

    /// Reconnect wait, raised to the minimum when configured lower
    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        let secs = if self.reconnect_delay_secs < MIN_RECONNECT_DELAY_SECS {
            warn!(
                "reconnect_delay_secs={} below {}, using {}",
                self.reconnect_delay_secs, MIN_RECONNECT_DELAY_SECS, MIN_RECONNECT_DELAY_SECS
            );
            MIN_RECONNECT_DELAY_SECS
        } else {
            self.reconnect_delay_secs
        };
        ReconnectPolicy::new(Duration::from_secs(secs))
    }
}
