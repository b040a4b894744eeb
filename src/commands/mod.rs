//! Temporary cache commands
//!
//! Every command runs the same way: access check on the resource, then
//! reads and writes through the region store. Nothing spans a lock, so
//! two concurrent writers to one key race and the last write wins.
//!
//! | Command | Needs entry | Owner only | Returns |
//! |---------|-------------|------------|---------|
//! | create  | no          | -          | new or reused key |
//! | get     | no          | no         | stored value |
//! | update  | yes (else no-op) | yes   | `UpdateOutcome` |
//! | delete  | yes (else false) | yes   | whether removed |

pub mod create;
pub mod delete;
pub mod get;
pub mod parameters;
pub mod update;

pub use create::CreateTemporaryCacheCommand;
pub use delete::DeleteTemporaryCacheCommand;
pub use get::GetTemporaryCacheCommand;
pub use parameters::CommandParameters;
pub use update::{UpdateOutcome, UpdateTemporaryCacheCommand};

use crate::access::{AccessCheck, GrantPolicy};
use crate::audit::{AuditEvent, AuditLog, AuditRecord, DenialReason};
use crate::backend::{create_backend, CacheBackend};
use crate::config::Config;
use crate::context::RequestContext;
use crate::error::{TempCacheError, TempCacheResult};
use crate::keys::{self, CacheKey};
use crate::store::{Region, TemporaryCacheStore};
use std::sync::Arc;
use tracing::debug;

/// Store, access policy and audit trail the commands run against
#[derive(Clone)]
pub struct TemporaryCache {
    store: TemporaryCacheStore,
    access: Arc<dyn AccessCheck>,
    audit: AuditLog,
}

impl TemporaryCache {
    pub fn new(store: TemporaryCacheStore, access: Arc<dyn AccessCheck>) -> Self {
        Self {
            store,
            access,
            audit: AuditLog::disabled(),
        }
    }

    /// Open one region on a freshly created backend
    ///
    /// Suits a process that touches a single region once, like the CLI.
    /// Long-lived callers create the backend once and use
    /// [`TemporaryCache::open_with_backend`] for every region and handle.
    pub async fn open(config: &Config, region: Region) -> TempCacheResult<Self> {
        let backend = create_backend(&config.cache).await?;
        Ok(Self::open_with_backend(backend, config, region))
    }

    /// Open one region on a shared backend with the configured grants and
    /// audit log
    pub fn open_with_backend(
        backend: Arc<dyn CacheBackend>,
        config: &Config,
        region: Region,
    ) -> Self {
        let store = TemporaryCacheStore::from_config(backend, region, config);
        let access = Arc::new(GrantPolicy::from_config(&config.access));
        Self::new(store, access).with_audit(AuditLog::new(config))
    }

    pub fn with_audit(mut self, audit: AuditLog) -> Self {
        self.audit = audit;
        self
    }

    pub fn store(&self) -> &TemporaryCacheStore {
        &self.store
    }

    pub async fn create(&self, params: CommandParameters) -> TempCacheResult<CacheKey> {
        CreateTemporaryCacheCommand::new(self, params).run().await
    }

    pub async fn get(&self, params: CommandParameters) -> TempCacheResult<Option<String>> {
        GetTemporaryCacheCommand::new(self, params).run().await
    }

    pub async fn update(&self, params: CommandParameters) -> TempCacheResult<UpdateOutcome> {
        UpdateTemporaryCacheCommand::new(self, params).run().await
    }

    pub async fn delete(&self, params: CommandParameters) -> TempCacheResult<bool> {
        DeleteTemporaryCacheCommand::new(self, params).run().await
    }

    pub(crate) async fn check_access(
        &self,
        ctx: &RequestContext,
        resource_id: &str,
    ) -> TempCacheResult<()> {
        let result = self.access.check_access(ctx, resource_id).await;
        if let Err(TempCacheError::AccessDenied { .. }) = &result {
            self.audit_denied(ctx, resource_id, DenialReason::Access)
                .await;
        }
        result
    }

    pub(crate) async fn audit_denied(
        &self,
        ctx: &RequestContext,
        resource_id: &str,
        reason: DenialReason,
    ) {
        let record = AuditRecord::denied(self.store.region(), resource_id, &ctx.user, reason);
        self.audit.record(&record).await;
    }

    pub(crate) async fn audit_write(
        &self,
        event: AuditEvent,
        params: &CommandParameters,
        key: &CacheKey,
    ) {
        let record = AuditRecord::new(
            event,
            self.store.region(),
            &params.resource_id,
            &params.context.user,
        )
        .with_key(key)
        .with_tab(params.tab_id);
        self.audit.record(&record).await;
    }

    /// Key previously resolved for this session, tab and resource
    ///
    /// A fresh key is minted when none is stored or when the caller is not
    /// tab scoped. Returns the key and whether it was minted. Nothing is
    /// written here.
    pub(crate) async fn resolve_key(
        &self,
        contextual: &CacheKey,
        params: &CommandParameters,
    ) -> TempCacheResult<(CacheKey, bool)> {
        let stored = if params.is_tab_scoped() {
            self.store.get_key(contextual).await?
        } else {
            None
        };

        match stored {
            Some(key) => {
                debug!("Reusing key {} for {}", key, contextual);
                Ok((key, false))
            }
            None => {
                let key = keys::random_key();
                debug!("Minted key {} for {}", key, contextual);
                Ok((key, true))
            }
        }
    }
}
