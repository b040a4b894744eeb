//! File-based cache backend
//!
//! Stores each value as `<hash>.json` in a directory, where the hash is
//! the first 16 bytes of the SHA256 of the key. The original key is kept
//! inside the file and checked on read.
//!
//! Writes go to a private temp file that is renamed over the value file, so
//! readers in any process see either the old or the new value. Every so
//! often a write also sweeps the directory for expired values, since keys
//! minted for untabbed updates are never read again.

use super::{CacheBackend, StoredValue};
use crate::error::{TempCacheError, TempCacheResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

/// Minimum time between directory sweeps
const SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Temp files older than this were left by a writer that died
const STALE_TEMP_AGE: Duration = Duration::from_secs(10 * 60);

/// Holds the time of the last sweep, shared by every process using the dir
const SWEEP_MARKER: &str = ".last_sweep";

/// Directory of JSON cache files
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
    sweep_interval: Duration,
}

impl FileBackend {
    /// Open a file backend, creating its directory
    pub async fn new(dir: impl Into<PathBuf>) -> TempCacheResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| TempCacheError::io(format!("creating cache dir {}", dir.display()), e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o700);
            std::fs::set_permissions(&dir, perms)
                .map_err(|e| TempCacheError::io("setting cache dir permissions", e))?;
        }

        Ok(Self {
            dir,
            sweep_interval: SWEEP_INTERVAL,
        })
    }

    /// Sweep for expired values at most once per `interval`
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Directory holding the cache files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Remove expired value files and abandoned temp files
    ///
    /// Returns how many files were removed. Files that fail to parse are
    /// left in place for `get` to report.
    pub async fn purge_expired(&self) -> TempCacheResult<usize> {
        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|e| TempCacheError::io(format!("listing {}", self.dir.display()), e))?;
        let mut purged = 0;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| TempCacheError::io(format!("listing {}", self.dir.display()), e))?
        {
            let path = entry.path();
            let expired = match path.extension().and_then(|ext| ext.to_str()) {
                Some("json") => matches!(self.read(&path).await, Ok(Some(stored)) if stored.is_expired()),
                Some("tmp") => is_stale_temp(&entry).await,
                _ => false,
            };

            if expired {
                self.remove(&path).await?;
                purged += 1;
            }
        }

        Ok(purged)
    }

    fn value_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.dir.join(format!("{}.json", hex::encode(&digest[..16])))
    }

    async fn read(&self, path: &Path) -> TempCacheResult<Option<StoredValue>> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(TempCacheError::io(
                    format!("reading cache file {}", path.display()),
                    e,
                ))
            }
        };

        serde_json::from_str(&content).map(Some).map_err(|e| {
            TempCacheError::backend(
                "file",
                format!("corrupt cache file {}: {}", path.display(), e),
            )
        })
    }

    /// Remove a file; one already gone was removed by another process
    async fn remove(&self, path: &Path) -> TempCacheResult<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TempCacheError::io(
                format!("removing cache file {}", path.display()),
                e,
            )),
        }
    }

    /// Write `content` to a private temp file, then rename it over `path`
    async fn write_atomic(&self, path: &Path, content: &str) -> TempCacheResult<()> {
        let tmp = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let written: std::io::Result<()> = async {
            let mut file = options.open(&tmp).await?;
            file.write_all(content.as_bytes()).await?;
            file.flush().await?;
            drop(file);
            fs::rename(&tmp, path).await
        }
        .await;

        if let Err(e) = written {
            let _ = fs::remove_file(&tmp).await;
            return Err(TempCacheError::io(
                format!("writing cache file {}", path.display()),
                e,
            ));
        }
        Ok(())
    }

    /// Whether this write should sweep; claims the sweep when it is due
    async fn sweep_due(&self) -> bool {
        let marker = self.dir.join(SWEEP_MARKER);
        let last = fs::read_to_string(&marker)
            .await
            .ok()
            .and_then(|at| DateTime::parse_from_rfc3339(at.trim()).ok());

        let due = match (last, chrono::Duration::from_std(self.sweep_interval)) {
            (Some(at), Ok(interval)) => Utc::now() - at.with_timezone(&Utc) >= interval,
            (Some(_), Err(_)) => false,
            (None, _) => true,
        };

        if due {
            if let Err(e) = fs::write(&marker, Utc::now().to_rfc3339()).await {
                warn!("Failed to record cache sweep in {}: {}", marker.display(), e);
            }
        }
        due
    }
}

async fn is_stale_temp(entry: &fs::DirEntry) -> bool {
    let modified = match entry.metadata().await.and_then(|m| m.modified()) {
        Ok(modified) => modified,
        Err(_) => return false,
    };
    SystemTime::now()
        .duration_since(modified)
        .is_ok_and(|age| age >= STALE_TEMP_AGE)
}

#[async_trait]
impl CacheBackend for FileBackend {
    async fn get(&self, key: &str) -> TempCacheResult<Option<serde_json::Value>> {
        let path = self.value_path(key);
        let Some(stored) = self.read(&path).await? else {
            return Ok(None);
        };

        if stored.key != key {
            debug!("Cache file {} belongs to another key", path.display());
            return Ok(None);
        }

        if stored.is_expired() {
            debug!("Cached value {} is expired", key);
            self.remove(&path).await?;
            return Ok(None);
        }

        Ok(Some(stored.value))
    }

    async fn set(
        &self,
        key: &str,
        value: serde_json::Value,
        timeout: Option<Duration>,
    ) -> TempCacheResult<()> {
        let path = self.value_path(key);
        let content = serde_json::to_string_pretty(&StoredValue::new(key, value, timeout))?;
        self.write_atomic(&path, &content).await?;

        if self.sweep_due().await {
            match self.purge_expired().await {
                Ok(0) => {}
                Ok(purged) => debug!("Swept {} expired cache files", purged),
                Err(e) => warn!("Cache sweep of {} failed: {}", self.dir.display(), e),
            }
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> TempCacheResult<bool> {
        let path = self.value_path(key);
        match self.read(&path).await? {
            Some(stored) if stored.key == key => {
                self.remove(&path).await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
