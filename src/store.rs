//! Typed store over a cache backend
//!
//! Each region (filter state, explore form data) shares the backend under
//! its own key prefix. Entries and contextual key indirections live side by
//! side in the same region, and every write carries the region timeout.

use crate::backend::CacheBackend;
use crate::config::{Config, RegionConfig};
use crate::context::UserId;
use crate::error::TempCacheResult;
use crate::keys::CacheKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Owner-tagged cached value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub owner: UserId,
    pub value: String,
}

impl Entry {
    pub fn new(owner: UserId, value: impl Into<String>) -> Self {
        Self {
            owner,
            value: value.into(),
        }
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner == user
    }
}

/// Logical cache sharing the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Dashboard native filter state, keyed by dashboard id
    FilterState,
    /// Explore form data, keyed by chart or dataset id
    ExploreFormData,
}

impl Region {
    /// Settings for this region
    pub fn settings<'a>(&self, config: &'a Config) -> &'a RegionConfig {
        match self {
            Self::FilterState => &config.filter_state,
            Self::ExploreFormData => &config.explore_form_data,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FilterState => "filter_state",
            Self::ExploreFormData => "explore_form_data",
        };
        write!(f, "{}", name)
    }
}

/// Get/set access to entries of one region
#[derive(Clone)]
pub struct TemporaryCacheStore {
    backend: Arc<dyn CacheBackend>,
    region: Region,
    settings: RegionConfig,
}

impl TemporaryCacheStore {
    pub fn new(backend: Arc<dyn CacheBackend>, region: Region, settings: RegionConfig) -> Self {
        Self {
            backend,
            region,
            settings,
        }
    }

    /// Store for a region using its settings from `config`
    pub fn from_config(backend: Arc<dyn CacheBackend>, region: Region, config: &Config) -> Self {
        Self::new(backend, region, region.settings(config).clone())
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// Whether reads should renew an entry's lifetime
    pub fn refresh_on_retrieval(&self) -> bool {
        self.settings.refresh_timeout_on_retrieval
    }

    fn backend_key(&self, key: &CacheKey) -> String {
        format!("{}{}", self.settings.key_prefix, key)
    }

    /// Read the entry stored at `key`
    pub async fn get(&self, key: &CacheKey) -> TempCacheResult<Option<Entry>> {
        match self.backend.get(&self.backend_key(key)).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Write an entry at `key`, replacing any previous one
    pub async fn set(&self, key: &CacheKey, entry: &Entry) -> TempCacheResult<()> {
        let value = serde_json::to_value(entry)?;
        self.backend
            .set(&self.backend_key(key), value, self.settings.timeout())
            .await?;
        debug!("Stored {} entry {} for {}", self.region, key, entry.owner);
        Ok(())
    }

    /// Read the resolved key a contextual key points at
    pub async fn get_key(&self, contextual: &CacheKey) -> TempCacheResult<Option<CacheKey>> {
        match self.backend.get(&self.backend_key(contextual)).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Point a contextual key at a resolved key
    pub async fn set_key(&self, contextual: &CacheKey, key: &CacheKey) -> TempCacheResult<()> {
        let value = serde_json::to_value(key)?;
        self.backend
            .set(&self.backend_key(contextual), value, self.settings.timeout())
            .await
    }

    /// Remove whatever is stored at `key`
    pub async fn delete(&self, key: &CacheKey) -> TempCacheResult<bool> {
        self.backend.delete(&self.backend_key(key)).await
    }
}
