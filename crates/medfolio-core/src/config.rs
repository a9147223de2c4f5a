//! Client configuration model.
//!
//! The same binary works against local and LAN deployments: an explicit base
//! URL wins, otherwise the URL is derived from a host and port.

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_HOST: &str = "localhost";
pub const DEFAULT_API_PORT: u16 = 8000;

/// Root of `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConfigRoot {
    #[serde(default)]
    pub api: ClientConfig,
}

/// How to reach the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Explicit base URL, e.g. `https://api.example.org`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    DEFAULT_API_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_API_PORT
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Resolves the base URL without a trailing slash.
    pub fn resolve_base_url(&self) -> String {
        match self.base_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.trim_end_matches('/').to_string(),
            _ => {
                let host = self.host.trim();
                let host = if host.is_empty() { DEFAULT_API_HOST } else { host };
                format!("http://{}:{}", host, self.port)
            }
        }
    }
}
