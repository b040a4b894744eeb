//! In-memory cache backend shared by every clone of the handle

use super::{CacheBackend, StoredValue};
use crate::error::TempCacheResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Map of cached values, shared by every clone of the handle
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    values: Arc<RwLock<HashMap<String, StoredValue>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired value, returning how many went
    pub async fn purge_expired(&self) -> usize {
        sweep(&mut *self.values.write().await)
    }

    /// Number of stored values, expired ones not yet swept included
    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Keys written once and never read again would otherwise stay forever
fn sweep(values: &mut HashMap<String, StoredValue>) -> usize {
    let before = values.len();
    values.retain(|_, stored| !stored.is_expired());
    let purged = before - values.len();
    if purged > 0 {
        debug!("Swept {} expired values", purged);
    }
    purged
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn get(&self, key: &str) -> TempCacheResult<Option<serde_json::Value>> {
        {
            let values = self.values.read().await;
            match values.get(key) {
                None => return Ok(None),
                Some(stored) if !stored.is_expired() => return Ok(Some(stored.value.clone())),
                Some(_) => {}
            }
        }

        // Expired: purge unless a writer replaced it in between
        let mut values = self.values.write().await;
        if values.get(key).is_some_and(StoredValue::is_expired) {
            values.remove(key);
            debug!("Purged expired value {}", key);
            return Ok(None);
        }
        Ok(values.get(key).map(|stored| stored.value.clone()))
    }

    async fn set(
        &self,
        key: &str,
        value: serde_json::Value,
        timeout: Option<Duration>,
    ) -> TempCacheResult<()> {
        let stored = StoredValue::new(key, value, timeout);
        let mut values = self.values.write().await;
        values.insert(key.to_string(), stored);
        sweep(&mut values);
        Ok(())
    }

    async fn delete(&self, key: &str) -> TempCacheResult<bool> {
        Ok(self.values.write().await.remove(key).is_some())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
