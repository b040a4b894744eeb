//! Create a temporary cache entry owned by the acting user

use super::{CommandParameters, TemporaryCache};
use crate::audit::AuditEvent;
use crate::error::TempCacheResult;
use crate::keys::{self, CacheKey};
use crate::store::Entry;
use tracing::info;

/// Store a value and return the key it can be fetched with
///
/// Tab-scoped callers get the key already resolved for their session and
/// tab, so repeated creates from one tab overwrite one entry.
pub struct CreateTemporaryCacheCommand<'a> {
    cache: &'a TemporaryCache,
    params: CommandParameters,
}

impl<'a> CreateTemporaryCacheCommand<'a> {
    pub fn new(cache: &'a TemporaryCache, params: CommandParameters) -> Self {
        Self { cache, params }
    }

    pub async fn run(self) -> TempCacheResult<CacheKey> {
        let params = &self.params;
        let value = params.require_value()?;
        let ctx = &params.context;
        let store = self.cache.store();

        let contextual = keys::contextual_key(&ctx.session_id, params.tab_id, &params.resource_id);
        let (key, _) = self.cache.resolve_key(&contextual, params).await?;

        self.cache.check_access(ctx, &params.resource_id).await?;

        let entry = Entry::new(ctx.user.clone(), value);
        store
            .set(&keys::entry_key(&params.resource_id, Some(&key)), &entry)
            .await?;
        store.set_key(&contextual, &key).await?;

        info!(
            "Created {} entry for resource {} under key {}",
            store.region(),
            params.resource_id,
            key
        );
        self.cache.audit_write(AuditEvent::Created, params, &key).await;

        Ok(key)
    }
}
