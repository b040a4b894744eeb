//! Configuration loading for tempcache
//!
//! A config is only handed out once it parses and validates, so commands
//! never start against an unknown backend or overlapping region prefixes.

pub mod schema;

pub use schema::{AccessConfig, CacheConfig, Config, GeneralConfig, RegionConfig};

use crate::error::{TempCacheError, TempCacheResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Platform state directory holding the file cache and audit log
pub fn state_dir() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tempcache")
}

/// Reads and writes the config file at one path
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Manager for `~/.config/tempcache/config.toml`
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tempcache")
            .join("config.toml")
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load and validate the config; a missing file yields the defaults
    pub async fn load(&self) -> TempCacheResult<Config> {
        let content = match fs::read_to_string(&self.config_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", self.config_path.display());
                return Ok(Config::default());
            }
            Err(e) => {
                return Err(TempCacheError::io(
                    format!("reading config from {}", self.config_path.display()),
                    e,
                ))
            }
        };

        let config = self.parse(&content)?;
        debug!(
            "Config selects the {} backend, prefixes {:?} and {:?}",
            config.cache.backend, config.filter_state.key_prefix, config.explore_form_data.key_prefix
        );
        Ok(config)
    }

    /// Parse and validate config text, blaming this manager's path on failure
    pub fn parse(&self, content: &str) -> TempCacheResult<Config> {
        let config: Config = toml::from_str(content).map_err(|e| self.invalid(e.to_string()))?;
        config.validate().map_err(|reason| self.invalid(reason))?;
        Ok(config)
    }

    /// Write a validated config, creating the parent directory
    pub async fn save(&self, config: &Config) -> TempCacheResult<()> {
        config.validate().map_err(|reason| self.invalid(reason))?;
        let content = toml::to_string_pretty(config)?;

        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| TempCacheError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        fs::write(&self.config_path, content).await.map_err(|e| {
            TempCacheError::io(format!("writing config to {}", self.config_path.display()), e)
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    fn invalid(&self, reason: String) -> TempCacheError {
        TempCacheError::ConfigInvalid {
            path: self.config_path.clone(),
            reason,
        }
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
