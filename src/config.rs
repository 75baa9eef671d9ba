//! Client configuration for the adapter, wallet hub and broker services

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Location of one remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// The hostname where the service is accessible
    pub host: String,
    /// The port where the service is listening
    pub port: u16,
    /// Base endpoint of the service's API
    #[serde(default)]
    pub base: String,
}

impl ServiceConfig {
    pub fn new(host: impl Into<String>, port: u16, base: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            base: base.into(),
        }
    }

    /// REST endpoint root for this service
    pub fn http_url(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.base)
    }

    /// WebSocket endpoint root for this service
    pub fn ws_url(&self) -> String {
        format!("ws://{}:{}{}", self.host, self.port, self.base)
    }
}

/// Top-level configuration, one section per remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Adapter service: transactions, protocol encoding, token queries
    pub adapter: ServiceConfig,
    /// Wallet hub service: account balances
    pub wallet: ServiceConfig,
    /// Broker service: the notification WebSocket
    pub broker: ServiceConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            adapter: ServiceConfig::new("localhost", 3000, ""),
            wallet: ServiceConfig::new("localhost", 3001, ""),
            broker: ServiceConfig::new("localhost", 3002, ""),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}
