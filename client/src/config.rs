// arbor/client/src/config.rs

use anyhow::{Context, Result};
use arbor_sync::DEFAULT_MAX_TREE_HEIGHT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the tree server
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Directory for the local RocksDB store
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Deepest tree accepted before the stream is treated as malformed
    #[serde(default = "default_max_tree_height")]
    pub max_tree_height: usize,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_server_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./arbor-data")
}

fn default_max_tree_height() -> usize {
    DEFAULT_MAX_TREE_HEIGHT
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            db_path: default_db_path(),
            max_tree_height: default_max_tree_height(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server_url.is_empty() {
            anyhow::bail!("server_url must not be empty");
        }
        if self.max_tree_height == 0 {
            anyhow::bail!("max_tree_height must be at least 1");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be at least 1");
        }
        Ok(())
    }
}
