//! Update an existing temporary cache entry

use super::{CommandParameters, TemporaryCache};
use crate::audit::{AuditEvent, DenialReason};
use crate::error::{TempCacheError, TempCacheResult};
use crate::keys::{self, CacheKey};
use crate::store::Entry;
use tracing::{info, warn};

/// Result of an update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Value written under a newly minted key
    Created(CacheKey),
    /// Value written under the key already resolved for this tab
    Updated(CacheKey),
    /// No entry existed at the lookup key; nothing was written
    NoOp(Option<CacheKey>),
}

impl UpdateOutcome {
    /// Key the caller should use from now on
    pub fn key(&self) -> Option<&CacheKey> {
        match self {
            Self::Created(key) | Self::Updated(key) => Some(key),
            Self::NoOp(key) => key.as_ref(),
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp(_))
    }
}

/// Overwrite an entry the acting user owns, re-keying it per tab
///
/// Updates only proceed when an entry already exists at the lookup key;
/// otherwise the lookup key is handed back untouched. Entries are created
/// through [`super::CreateTemporaryCacheCommand`].
pub struct UpdateTemporaryCacheCommand<'a> {
    cache: &'a TemporaryCache,
    params: CommandParameters,
}

impl<'a> UpdateTemporaryCacheCommand<'a> {
    pub fn new(cache: &'a TemporaryCache, params: CommandParameters) -> Self {
        Self { cache, params }
    }

    pub async fn run(self) -> TempCacheResult<UpdateOutcome> {
        let params = &self.params;
        let value = params.require_value()?;
        let ctx = &params.context;
        let store = self.cache.store();

        self.cache.check_access(ctx, &params.resource_id).await?;

        let primary = keys::entry_key(&params.resource_id, params.key.as_ref());
        let Some(entry) = store.get(&primary).await? else {
            return Ok(UpdateOutcome::NoOp(params.key.clone()));
        };

        if !entry.is_owned_by(&ctx.user) {
            warn!(
                "User {} may not update {} entry {}",
                ctx.user,
                store.region(),
                primary
            );
            self.cache
                .audit_denied(ctx, &params.resource_id, DenialReason::Ownership)
                .await;
            return Err(TempCacheError::OwnershipDenied {
                key: primary.to_string(),
            });
        }

        let contextual = keys::contextual_key(&ctx.session_id, params.tab_id, &params.resource_id);
        let (key, minted) = self.cache.resolve_key(&contextual, params).await?;
        if minted {
            store.set_key(&contextual, &key).await?;
        }

        let new_entry = Entry::new(ctx.user.clone(), value);
        store
            .set(&keys::entry_key(&params.resource_id, Some(&key)), &new_entry)
            .await?;

        info!(
            "Updated {} entry for resource {} under key {}",
            store.region(),
            params.resource_id,
            key
        );
        self.cache.audit_write(AuditEvent::Updated, params, &key).await;

        Ok(if minted {
            UpdateOutcome::Created(key)
        } else {
            UpdateOutcome::Updated(key)
        })
    }
}
