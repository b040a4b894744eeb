//! Configuration schema for tempcache
//!
//! Configuration is stored at `~/.config/tempcache/config.toml`

use super::state_dir;
use crate::backend::BackendKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Seven days, matching the default filter state lifetime
const DEFAULT_TIMEOUT_SECS: u64 = 7 * 24 * 60 * 60;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Cache backend selection
    pub cache: CacheConfig,

    /// Dashboard filter state region
    pub filter_state: RegionConfig,

    /// Explore form data region
    pub explore_form_data: RegionConfig,

    /// Resource access grants
    pub access: AccessConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            cache: CacheConfig::default(),
            filter_state: RegionConfig::with_prefix("filter_state_"),
            explore_form_data: RegionConfig::with_prefix("explore_form_data_"),
            access: AccessConfig::default(),
        }
    }
}

impl Config {
    /// Check settings that parse but would misroute or merge entries
    pub fn validate(&self) -> Result<(), String> {
        self.cache
            .backend
            .parse::<BackendKind>()
            .map_err(|e| e.to_string())?;

        if !matches!(self.general.log_format.as_str(), "text" | "json") {
            return Err(format!(
                "general.log_format must be \"text\" or \"json\", got {:?}",
                self.general.log_format
            ));
        }

        let filter = &self.filter_state.key_prefix;
        let explore = &self.explore_form_data.key_prefix;
        for (section, prefix) in [("filter_state", filter), ("explore_form_data", explore)] {
            if prefix.is_empty() {
                return Err(format!("{}.key_prefix must not be empty", section));
            }
        }

        // A prefix of the other region's prefix lets their keys collide
        if filter.starts_with(explore.as_str()) || explore.starts_with(filter.as_str()) {
            return Err(format!(
                "filter_state.key_prefix {:?} and explore_form_data.key_prefix {:?} overlap",
                filter, explore
            ));
        }

        Ok(())
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,

    /// Enable audit logging
    pub audit_log: bool,

    /// Audit log file (default: state dir)
    pub audit_path: Option<PathBuf>,
}

impl GeneralConfig {
    /// Audit log file, falling back to the state directory
    pub fn audit_log_path(&self) -> PathBuf {
        self.audit_path
            .clone()
            .unwrap_or_else(|| state_dir().join("audit.log"))
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            audit_log: true,
            audit_path: None,
        }
    }
}

/// Cache backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Backend: "memory" or "file"
    pub backend: String,

    /// Directory for the file backend (default: state dir)
    pub dir: Option<PathBuf>,
}

impl CacheConfig {
    /// File backend directory, falling back to the state directory
    pub fn dir_or_default(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| state_dir().join("cache"))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: "file".to_string(),
            dir: None,
        }
    }
}

/// Settings for one cache region
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Prefix added to every backend key in this region
    pub key_prefix: String,

    /// Lifetime of written values in seconds (0 = never expire)
    #[serde(default = "default_timeout_secs")]
    pub default_timeout_secs: u64,

    /// Renew an entry's lifetime whenever it is read
    #[serde(default = "default_refresh")]
    pub refresh_timeout_on_retrieval: bool,
}

impl RegionConfig {
    /// Region settings with defaults and the given key prefix
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            key_prefix: prefix.to_string(),
            default_timeout_secs: DEFAULT_TIMEOUT_SECS,
            refresh_timeout_on_retrieval: true,
        }
    }

    /// Lifetime applied to writes, `None` when disabled
    pub fn timeout(&self) -> Option<Duration> {
        (self.default_timeout_secs > 0).then(|| Duration::from_secs(self.default_timeout_secs))
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_refresh() -> bool {
    true
}

/// Resource access grants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Grant every user access to every resource
    pub allow_all: bool,

    /// Resource ids each user may access
    pub grants: HashMap<String, Vec<String>>,

    /// When set, any other resource id is reported as not found
    pub known_resources: Option<Vec<String>>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            allow_all: true,
            grants: HashMap::new(),
            known_resources: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[filter_state]"));
        assert!(toml.contains("[explore_form_data]"));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.cache.backend, "file");
        assert_eq!(config.filter_state.key_prefix, "filter_state_");
        assert_eq!(config.explore_form_data.key_prefix, "explore_form_data_");
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [filter_state]
            key_prefix = "fs_"
            default_timeout_secs = 60

            [access]
            allow_all = false
            grants = { alice = ["42"] }
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.filter_state.key_prefix, "fs_");
        assert_eq!(config.filter_state.timeout(), Some(Duration::from_secs(60)));
        assert!(config.filter_state.refresh_timeout_on_retrieval); // default preserved
        assert_eq!(config.explore_form_data.key_prefix, "explore_form_data_");
        assert!(!config.access.allow_all);
        assert_eq!(config.access.grants["alice"], vec!["42"]);
    }

    #[test]
    fn default_config_is_valid() {
        assert_eq!(Config::default().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_unknown_backend() {
        let mut config = Config::default();
        config.cache.backend = "redis".to_string();
        let reason = config.validate().unwrap_err();
        assert!(reason.contains("Unknown cache backend"), "{}", reason);
    }

    #[test]
    fn validate_rejects_unknown_log_format() {
        let mut config = Config::default();
        config.general.log_format = "xml".to_string();
        assert!(config.validate().unwrap_err().contains("log_format"));
    }

    #[test]
    fn validate_rejects_empty_prefix() {
        let mut config = Config::default();
        config.explore_form_data.key_prefix = String::new();
        let reason = config.validate().unwrap_err();
        assert!(reason.contains("explore_form_data.key_prefix"), "{}", reason);
    }

    #[test]
    fn validate_rejects_shared_prefix() {
        let mut config = Config::default();
        config.explore_form_data.key_prefix = "filter_state_".to_string();
        assert!(config.validate().unwrap_err().contains("overlap"));
    }

    #[test]
    fn validate_rejects_nested_prefix() {
        let mut config = Config::default();
        config.filter_state.key_prefix = "tc_".to_string();
        config.explore_form_data.key_prefix = "tc_explore_".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn paths_fall_back_to_state_dir() {
        let config = Config::default();
        assert!(config.cache.dir_or_default().ends_with("cache"));
        assert!(config.general.audit_log_path().ends_with("audit.log"));

        let mut config = Config::default();
        config.cache.dir = Some(PathBuf::from("/srv/tempcache"));
        assert_eq!(config.cache.dir_or_default(), PathBuf::from("/srv/tempcache"));
    }

    #[test]
    fn zero_timeout_disables_expiry() {
        let mut region = RegionConfig::with_prefix("x_");
        region.default_timeout_secs = 0;
        assert!(region.timeout().is_none());
    }
}
