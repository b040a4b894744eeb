//! Read a temporary cache value

use super::{CommandParameters, TemporaryCache};
use crate::error::TempCacheResult;
use crate::keys;
use tracing::debug;

/// Fetch the value stored for a resource and key
///
/// Reads are open to any user with access to the resource. When the region
/// refreshes on retrieval, the entry is written back to renew its lifetime.
pub struct GetTemporaryCacheCommand<'a> {
    cache: &'a TemporaryCache,
    params: CommandParameters,
}

impl<'a> GetTemporaryCacheCommand<'a> {
    pub fn new(cache: &'a TemporaryCache, params: CommandParameters) -> Self {
        Self { cache, params }
    }

    pub async fn run(self) -> TempCacheResult<Option<String>> {
        let params = &self.params;
        let store = self.cache.store();

        self.cache
            .check_access(&params.context, &params.resource_id)
            .await?;

        let key = keys::entry_key(&params.resource_id, params.key.as_ref());
        let Some(entry) = store.get(&key).await? else {
            debug!("No {} entry at {}", store.region(), key);
            return Ok(None);
        };

        if store.refresh_on_retrieval() {
            store.set(&key, &entry).await?;
        }

        Ok(Some(entry.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{AccessCheck, GrantPolicy};
    use crate::backend::{CacheBackend, MemoryBackend};
    use crate::commands::test_support::{open_cache, params, seed};
    use crate::config::Config;
    use crate::error::TempCacheError;
    use crate::store::{Region, TemporaryCacheStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Memory backend that counts writes
    #[derive(Default)]
    struct CountingBackend {
        inner: MemoryBackend,
        sets: AtomicUsize,
    }

    #[async_trait]
    impl CacheBackend for CountingBackend {
        async fn get(&self, key: &str) -> TempCacheResult<Option<serde_json::Value>> {
            self.inner.get(key).await
        }

        async fn set(
            &self,
            key: &str,
            value: serde_json::Value,
            timeout: Option<Duration>,
        ) -> TempCacheResult<()> {
            self.sets.fetch_add(1, Ordering::SeqCst);
            self.inner.set(key, value, timeout).await
        }

        async fn delete(&self, key: &str) -> TempCacheResult<bool> {
            self.inner.delete(key).await
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    fn counting_cache(refresh: bool) -> (TemporaryCache, Arc<CountingBackend>) {
        let backend = Arc::new(CountingBackend::default());
        let mut config = Config::default();
        config.filter_state.refresh_timeout_on_retrieval = refresh;
        let store = TemporaryCacheStore::from_config(backend.clone(), Region::FilterState, &config);
        let access: Arc<dyn AccessCheck> = Arc::new(GrantPolicy::allow_all());
        (TemporaryCache::new(store, access), backend)
    }

    #[tokio::test]
    async fn get_returns_value_for_any_user() {
        let (cache, _) = open_cache();
        seed(&cache, "42", "k1", "alice", "state").await;

        let value = cache
            .get(params("bob", "s2", "42").with_key("k1"))
            .await
            .unwrap();

        assert_eq!(value.as_deref(), Some("state"));
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let (cache, _) = open_cache();
        let value = cache
            .get(params("alice", "s1", "42").with_key("nope"))
            .await
            .unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn get_refreshes_when_configured() {
        let (cache, backend) = counting_cache(true);
        seed(&cache, "42", "k1", "alice", "state").await;
        let before = backend.sets.load(Ordering::SeqCst);

        cache
            .get(params("alice", "s1", "42").with_key("k1"))
            .await
            .unwrap();

        assert_eq!(backend.sets.load(Ordering::SeqCst), before + 1);
    }

    #[tokio::test]
    async fn get_does_not_write_without_refresh() {
        let (cache, backend) = counting_cache(false);
        seed(&cache, "42", "k1", "alice", "state").await;
        let before = backend.sets.load(Ordering::SeqCst);

        let value = cache
            .get(params("alice", "s1", "42").with_key("k1"))
            .await
            .unwrap();

        assert_eq!(value.as_deref(), Some("state"));
        assert_eq!(backend.sets.load(Ordering::SeqCst), before);
    }

    #[tokio::test]
    async fn get_checks_access() {
        let (cache, _) = open_cache();
        let denied = TemporaryCache::new(
            cache.store().clone(),
            Arc::new(GrantPolicy::default()),
        );
        seed(&cache, "42", "k1", "alice", "state").await;

        let result = denied.get(params("alice", "s1", "42").with_key("k1")).await;
        assert!(matches!(result, Err(TempCacheError::AccessDenied { .. })));
    }
}
