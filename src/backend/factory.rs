//! Backend factory driven by configuration

use super::{CacheBackend, FileBackend, MemoryBackend};
use crate::config::CacheConfig;
use crate::error::{TempCacheError, TempCacheResult};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Configured backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// In-process map
    Memory,
    /// JSON files in a directory
    File,
}

impl BackendKind {
    /// Get the config name of this backend
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::Memory => "memory",
            BackendKind::File => "file",
        }
    }
}

impl FromStr for BackendKind {
    type Err = TempCacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(BackendKind::Memory),
            "file" => Ok(BackendKind::File),
            other => Err(TempCacheError::UnknownBackend(other.to_string())),
        }
    }
}

/// Create the cache backend selected by `[cache]`
///
/// Each call builds a new backend; a memory backend starts empty. Create it
/// once and hand clones of the `Arc` to every store that should see the
/// same values.
pub async fn create_backend(config: &CacheConfig) -> TempCacheResult<Arc<dyn CacheBackend>> {
    let kind: BackendKind = config.backend.parse()?;
    debug!("Using {} cache backend", kind.name());

    match kind {
        BackendKind::Memory => Ok(Arc::new(MemoryBackend::new())),
        BackendKind::File => {
            let dir = config.dir_or_default();
            Ok(Arc::new(FileBackend::new(dir).await?))
        }
    }
}
