//! Configuration service.
//!
//! Resolution order, later wins: built-in defaults, `config.toml`,
//! environment (`MEDFOLIO_API_URL`, `MEDFOLIO_API_HOST`, `MEDFOLIO_API_PORT`),
//! then explicit overrides such as command-line flags.

use medfolio_core::config::{ClientConfig, ConfigRoot};
use medfolio_core::error::Result;
use medfolio_core::MedfolioError;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::paths::MedfolioPaths;
use crate::storage::AtomicTomlFile;

pub const ENV_API_URL: &str = "MEDFOLIO_API_URL";
pub const ENV_API_HOST: &str = "MEDFOLIO_API_HOST";
pub const ENV_API_PORT: &str = "MEDFOLIO_API_PORT";

/// Last-layer overrides, typically from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl ConfigOverrides {
    fn apply(&self, config: &mut ClientConfig) {
        if let Some(url) = &self.base_url {
            config.base_url = Some(url.clone());
        }
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
    }

    /// Reads overrides from a snapshot of environment variables.
    ///
    /// An unparsable port is a configuration error rather than silently
    /// falling back.
    pub fn from_env_map(env: &HashMap<String, String>) -> Result<Self> {
        let non_empty = |key: &str| {
            env.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let port = match non_empty(ENV_API_PORT) {
            Some(raw) => Some(raw.parse::<u16>().map_err(|_| {
                MedfolioError::config(format!("{ENV_API_PORT} must be a port number, got '{raw}'"))
            })?),
            None => None,
        };
        Ok(Self {
            base_url: non_empty(ENV_API_URL),
            host: non_empty(ENV_API_HOST),
            port,
        })
    }
}

/// Loads the client configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    config_path: PathBuf,
}

impl ConfigService {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn from_paths(paths: &MedfolioPaths) -> Result<Self> {
        let path = paths
            .config_file()
            .map_err(|e| MedfolioError::config(e.to_string()))?;
        Ok(Self::new(path))
    }

    /// Reads `config.toml`; a missing file yields defaults.
    pub fn load_file(&self) -> Result<ConfigRoot> {
        let file = AtomicTomlFile::<ConfigRoot>::new(self.config_path.clone());
        file.load().map_err(|e| {
            MedfolioError::config(format!(
                "Failed to read {}: {}",
                self.config_path.display(),
                e
            ))
        })
    }

    /// Full resolution: file, then process environment, then `overrides`.
    pub fn resolve(&self, overrides: &ConfigOverrides) -> Result<ClientConfig> {
        let env: HashMap<String, String> = std::env::vars().collect();
        self.resolve_with_env(&env, overrides)
    }

    pub fn resolve_with_env(
        &self,
        env: &HashMap<String, String>,
        overrides: &ConfigOverrides,
    ) -> Result<ClientConfig> {
        let mut config = self.load_file()?.api;
        ConfigOverrides::from_env_map(env)?.apply(&mut config);
        overrides.apply(&mut config);
        tracing::debug!(
            base_url = %config.resolve_base_url(),
            path = %self.config_path.display(),
            "Resolved client configuration"
        );
        Ok(config)
    }
}
