//! Resource access checks
//!
//! Commands ask an `AccessCheck` whether the acting user may touch a
//! resource before reading or writing its cache entries.

use crate::config::AccessConfig;
use crate::context::RequestContext;
use crate::error::{TempCacheError, TempCacheResult};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Permission collaborator consulted by every command
#[async_trait]
pub trait AccessCheck: Send + Sync {
    /// Fail with `AccessDenied` or `ResourceNotFound` when the user may not
    /// use the resource
    async fn check_access(&self, ctx: &RequestContext, resource_id: &str) -> TempCacheResult<()>;
}

/// Static grants loaded from `[access]`
#[derive(Debug, Clone, Default)]
pub struct GrantPolicy {
    allow_all: bool,
    grants: HashMap<String, HashSet<String>>,
    known_resources: Option<HashSet<String>>,
}

impl GrantPolicy {
    /// Policy letting every user access every resource
    pub fn allow_all() -> Self {
        Self {
            allow_all: true,
            ..Self::default()
        }
    }

    pub fn from_config(config: &AccessConfig) -> Self {
        Self {
            allow_all: config.allow_all,
            grants: config
                .grants
                .iter()
                .map(|(user, ids)| (user.clone(), ids.iter().cloned().collect()))
                .collect(),
            known_resources: config
                .known_resources
                .as_ref()
                .map(|ids| ids.iter().cloned().collect()),
        }
    }

    /// Allow `user` to access `resource_id`
    pub fn grant(mut self, user: &str, resource_id: &str) -> Self {
        self.grants
            .entry(user.to_string())
            .or_default()
            .insert(resource_id.to_string());
        self
    }
}

#[async_trait]
impl AccessCheck for GrantPolicy {
    async fn check_access(&self, ctx: &RequestContext, resource_id: &str) -> TempCacheResult<()> {
        if let Some(known) = &self.known_resources {
            if !known.contains(resource_id) {
                return Err(TempCacheError::ResourceNotFound(resource_id.to_string()));
            }
        }

        if self.allow_all {
            return Ok(());
        }

        let granted = self
            .grants
            .get(ctx.user.as_str())
            .is_some_and(|ids| ids.contains(resource_id));

        if granted {
            Ok(())
        } else {
            warn!("User {} denied access to resource {}", ctx.user, resource_id);
            Err(TempCacheError::access_denied(resource_id))
        }
    }
}
