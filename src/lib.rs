//! tempcache - Owner-scoped temporary cache
//!
//! Keeps ephemeral UI state (dashboard filter state, explore form data)
//! in a shared TTL cache. Values are stored under per-session, per-tab
//! keys and only the user who created an entry may change or delete it.

pub mod access;
pub mod audit;
pub mod backend;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod keys;
pub mod store;

pub use commands::{CommandParameters, TemporaryCache, UpdateOutcome};
pub use context::RequestContext;
pub use error::{TempCacheError, TempCacheResult};
pub use keys::{cache_key, random_key, CacheKey};
pub use store::{Entry, Region, TemporaryCacheStore};
