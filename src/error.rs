//! Error types for tempcache
//!
//! All modules use `TempCacheResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tempcache operations
pub type TempCacheResult<T> = Result<T, TempCacheError>;

/// All errors that can occur in tempcache
#[derive(Error, Debug)]
pub enum TempCacheError {
    // Permission errors
    #[error("Access denied to resource {resource_id}")]
    AccessDenied { resource_id: String },

    #[error("Cache entry {key} is owned by another user")]
    OwnershipDenied { key: String },

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    // Command errors
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    // Backend errors
    #[error("Cache backend {backend} failed: {reason}")]
    Backend { backend: String, reason: String },

    #[error("Unknown cache backend: {0}")]
    UnknownBackend(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TempCacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a backend error
    pub fn backend(backend: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Backend {
            backend: backend.into(),
            reason: reason.into(),
        }
    }

    /// Create an access denied error for a resource
    pub fn access_denied(resource_id: impl Into<String>) -> Self {
        Self::AccessDenied {
            resource_id: resource_id.into(),
        }
    }

    /// HTTP-equivalent status code for callers that surface errors over a wire
    pub fn status(&self) -> u16 {
        match self {
            Self::AccessDenied { .. } | Self::OwnershipDenied { .. } => 403,
            Self::ResourceNotFound(_) => 404,
            Self::InvalidParameters(_) => 400,
            Self::ConfigInvalid { .. } | Self::UnknownBackend(_) => 422,
            _ => 500,
        }
    }

    /// Check if error is retryable
    ///
    /// Permission and ownership failures are terminal for the request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Backend { .. } | Self::Io { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::AccessDenied { .. } => Some("Grant the user access under [access] in the config"),
            Self::OwnershipDenied { .. } => {
                Some("Only the user who created an entry may change or delete it")
            }
            Self::UnknownBackend(_) => Some("Set cache.backend to \"memory\" or \"file\""),
            Self::ConfigInvalid { .. } => Some("Run: tempcache config init --force"),
            _ => None,
        }
    }
}
