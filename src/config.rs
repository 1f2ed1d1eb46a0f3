use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::runner::MAX_SCRIPT_SIZE;

/// System-wide configuration file, read when present and no `--config` is given.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/hash/hash.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top‑level configuration. Every field is optional so CLI flags and
/// environment variables can fill in what the file leaves out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HashConfig {
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub install: InstallConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunnerConfig {
    pub host_id: Option<String>,
    pub decoder: Option<String>,
    pub encoder: Option<String>,
    pub max_script_size: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstallConfig {
    pub mount_point: Option<String>,
    pub bin_dir: Option<String>,
    pub unit_dir: Option<String>,
    pub udev_rules_dir: Option<String>,
}

impl HashConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, [`DEFAULT_CONFIG_PATH`] is
    /// used if present and built-in defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) if !path.exists() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => path.to_path_buf(),
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if !path.exists() {
                    log::debug!("No config at {}, using defaults", path.display());
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let cfg = Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;

        log::info!("Using config from: {}", path.display());
        Ok(cfg)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Host id announced to scripts as `HASH_HOST`.
    pub fn host_id(&self, flag: Option<String>) -> String {
        flag.or_else(|| self.runner.host_id.clone())
            .unwrap_or_else(default_host_id)
    }

    pub fn decoder(&self, flag: Option<String>) -> Option<String> {
        flag.or_else(|| self.runner.decoder.clone())
            .filter(|d| !d.trim().is_empty())
    }

    pub fn encoder(&self, flag: Option<String>) -> Option<String> {
        flag.or_else(|| self.runner.encoder.clone())
            .filter(|e| !e.trim().is_empty())
    }

    pub fn max_script_size(&self) -> u64 {
        self.runner.max_script_size.unwrap_or(MAX_SCRIPT_SIZE)
    }
}

pub fn default_host_id() -> String {
    format!("Hash host v{}", env!("CARGO_PKG_VERSION"))
}
