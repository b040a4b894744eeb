//! Delete a temporary cache entry

use super::{CommandParameters, TemporaryCache};
use crate::audit::{AuditEvent, DenialReason};
use crate::error::{TempCacheError, TempCacheResult};
use crate::keys;
use tracing::{info, warn};

/// Remove an entry the acting user owns, along with its tab indirection
pub struct DeleteTemporaryCacheCommand<'a> {
    cache: &'a TemporaryCache,
    params: CommandParameters,
}

impl<'a> DeleteTemporaryCacheCommand<'a> {
    pub fn new(cache: &'a TemporaryCache, params: CommandParameters) -> Self {
        Self { cache, params }
    }

    /// Returns whether an entry was removed
    pub async fn run(self) -> TempCacheResult<bool> {
        let params = &self.params;
        let ctx = &params.context;
        let store = self.cache.store();

        self.cache.check_access(ctx, &params.resource_id).await?;

        let key = keys::entry_key(&params.resource_id, params.key.as_ref());
        let Some(entry) = store.get(&key).await? else {
            return Ok(false);
        };

        if !entry.is_owned_by(&ctx.user) {
            warn!("User {} may not delete {} entry {}", ctx.user, store.region(), key);
            self.cache
                .audit_denied(ctx, &params.resource_id, DenialReason::Ownership)
                .await;
            return Err(TempCacheError::OwnershipDenied {
                key: key.to_string(),
            });
        }

        let contextual = keys::contextual_key(&ctx.session_id, params.tab_id, &params.resource_id);
        store.delete(&contextual).await?;
        let removed = store.delete(&key).await?;

        if removed {
            info!("Deleted {} entry {}", store.region(), key);
            self.cache.audit_write(AuditEvent::Deleted, params, &key).await;
        }
        Ok(removed)
    }
}
