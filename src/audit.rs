//! Audit trail for cache mutations and denials
//!
//! Every create, update and delete, and every refused request, appends one
//! `AuditRecord` as a JSON line. Recording never fails a command.

use crate::config::Config;
use crate::context::UserId;
use crate::error::{TempCacheError, TempCacheResult};
use crate::keys::CacheKey;
use crate::store::Region;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// What happened to an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditEvent {
    #[serde(rename = "entry.created")]
    Created,
    #[serde(rename = "entry.updated")]
    Updated,
    #[serde(rename = "entry.deleted")]
    Deleted,
    #[serde(rename = "entry.denied")]
    Denied,
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "entry.created",
            Self::Updated => "entry.updated",
            Self::Deleted => "entry.deleted",
            Self::Denied => "entry.denied",
        };
        f.write_str(name)
    }
}

/// Why a request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DenialReason {
    /// No access to the resource
    Access,
    /// Entry belongs to another user
    Ownership,
}

/// One line of the audit log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    pub event: AuditEvent,
    pub region: String,
    pub resource_id: String,
    pub user: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<CacheKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenialReason>,
}

impl AuditRecord {
    pub fn new(event: AuditEvent, region: Region, resource_id: &str, user: &UserId) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
            region: region.to_string(),
            resource_id: resource_id.to_string(),
            user: user.clone(),
            key: None,
            tab_id: None,
            reason: None,
        }
    }

    /// Refusal of a request on `resource_id`
    pub fn denied(region: Region, resource_id: &str, user: &UserId, reason: DenialReason) -> Self {
        Self {
            reason: Some(reason),
            ..Self::new(AuditEvent::Denied, region, resource_id, user)
        }
    }

    pub fn with_key(mut self, key: &CacheKey) -> Self {
        self.key = Some(key.clone());
        self
    }

    pub fn with_tab(mut self, tab_id: Option<u32>) -> Self {
        self.tab_id = tab_id;
        self
    }
}

/// Append-only JSON-lines audit log; `None` path means disabled
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    path: Option<PathBuf>,
}

impl AuditLog {
    /// Audit log per `general.audit_log` and `general.audit_path`
    pub fn new(config: &Config) -> Self {
        Self {
            path: config
                .general
                .audit_log
                .then(|| config.general.audit_log_path()),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append a record, reporting failures through tracing only
    pub async fn record(&self, record: &AuditRecord) {
        let Some(path) = &self.path else {
            return;
        };

        if let Err(e) = append(path, record).await {
            warn!("Failed to record {} for resource {}: {}", record.event, record.resource_id, e);
        }
    }
}

async fn append(path: &Path, record: &AuditRecord) -> TempCacheResult<()> {
    let mut line = serde_json::to_string(record)?;
    line.push('\n');

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| TempCacheError::io(format!("creating {}", parent.display()), e))?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| TempCacheError::io(format!("opening audit log {}", path.display()), e))?;

    // One write per record so concurrent appenders never interleave a line
    file.write_all(line.as_bytes())
        .await
        .map_err(|e| TempCacheError::io(format!("appending to {}", path.display()), e))
}

#[cfg(test)]
pub(crate) fn read_records(path: &Path) -> Vec<AuditRecord> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}
