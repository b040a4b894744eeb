//! Pluggable cache backends
//!
//! Provides a generic key-value interface with per-write TTL:
//! - `memory`: in-process map shared by every clone of the handle
//! - `file`: one JSON file per key, survives across processes
//!
//! Backends do not coordinate across keys. A read followed by a write is
//! never atomic, the last write wins.

mod factory;
mod file;
mod memory;

pub use factory::{create_backend, BackendKind};
pub use file::FileBackend;
pub use memory::MemoryBackend;

use crate::error::TempCacheResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Abstract cache backend interface
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Read a value, treating expired values as absent
    async fn get(&self, key: &str) -> TempCacheResult<Option<serde_json::Value>>;

    /// Write a value; `None` timeout means it never expires
    async fn set(
        &self,
        key: &str,
        value: serde_json::Value,
        timeout: Option<Duration>,
    ) -> TempCacheResult<()>;

    /// Remove a value, returning whether one was present
    async fn delete(&self, key: &str) -> TempCacheResult<bool>;

    /// Backend name for logs and errors
    fn name(&self) -> &'static str;
}

/// Value as held by a backend, with its expiry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredValue {
    pub key: String,
    pub value: serde_json::Value,
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredValue {
    pub fn new(key: &str, value: serde_json::Value, timeout: Option<Duration>) -> Self {
        Self {
            key: key.to_string(),
            value,
            expires_at: expiry_from(timeout),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Utc::now() >= at)
    }
}

/// Absolute expiry for a timeout; out-of-range timeouts never expire
fn expiry_from(timeout: Option<Duration>) -> Option<DateTime<Utc>> {
    let delta = chrono::Duration::from_std(timeout?).ok()?;
    Utc::now().checked_add_signed(delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_timeout_never_expires() {
        let stored = StoredValue::new("k", serde_json::json!(1), None);
        assert!(stored.expires_at.is_none());
        assert!(!stored.is_expired());
    }

    #[test]
    fn zero_timeout_is_expired() {
        let stored = StoredValue::new("k", serde_json::json!(1), Some(Duration::ZERO));
        assert!(stored.is_expired());
    }

    #[test]
    fn huge_timeout_saturates_to_never() {
        let stored = StoredValue::new("k", serde_json::json!(1), Some(Duration::MAX));
        assert!(!stored.is_expired());
    }
}
