use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Environment variable holding the key index connection string.
pub const ENV_REDIS_URL: &str = "REDIS_CONNECTION_STRING";
/// Environment variable holding the blob store root directory.
pub const ENV_STORAGE_LOCATION: &str = fsapi_core::STORAGE_LOCATION;
/// Environment variable holding the listen address.
pub const ENV_BIND: &str = "FSAPI_BIND";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Key index connection string. Required to start.
    pub redis_url: Option<String>,
    /// Blob store root. When absent the server still starts, and storage
    /// object requests fail until it is configured.
    pub storage_location: Option<PathBuf>,
    /// Largest request body accepted, in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            redis_url: None,
            storage_location: None,
            max_body_bytes: 100 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Load from an optional TOML file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> ServerResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_toml(&std::fs::read_to_string(path)?)?,
            None => Self::default(),
        };
        config.apply_env_from(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml(source: &str) -> ServerResult<Self> {
        toml::from_str(source).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Override fields from variables returned by `lookup`. Empty values
    /// count as unset.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> ServerResult<()> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_REDIS_URL) {
            self.redis_url = Some(url);
        }
        if let Some(dir) = get(ENV_STORAGE_LOCATION) {
            self.storage_location = Some(PathBuf::from(dir));
        }
        if let Some(bind) = get(ENV_BIND) {
            self.bind_addr = bind
                .parse()
                .map_err(|e| ServerError::Config(format!("{ENV_BIND}={bind}: {e}")))?;
        }
        Ok(())
    }

    /// The key index connection string, or a configuration error.
    pub fn require_redis_url(&self) -> ServerResult<&str> {
        self.redis_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ServerError::Config(format!("{ENV_REDIS_URL} is not set")))
    }
}
