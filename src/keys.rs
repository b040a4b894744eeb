//! Cache key derivation
//!
//! Composite keys join their parts with `_`. Backslashes and underscores
//! inside a part are escaped first, and an absent part renders as a bare
//! `\N`, which no escaped part can contain. Distinct part lists, absent
//! parts included, never render to the same key.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

const SEPARATOR: char = '_';
const ESCAPE: char = '\\';
const ABSENT: &str = "\\N";

/// Opaque key under which a value is stored in a cache region
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CacheKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for CacheKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

fn push_escaped(out: &mut String, part: &str) {
    for c in part.chars() {
        if c == SEPARATOR || c == ESCAPE {
            out.push(ESCAPE);
        }
        out.push(c);
    }
}

fn join_parts<'a>(parts: impl IntoIterator<Item = Option<&'a str>>) -> CacheKey {
    let mut out = String::new();
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            out.push(SEPARATOR);
        }
        match part {
            Some(part) => push_escaped(&mut out, part),
            None => out.push_str(ABSENT),
        }
    }
    CacheKey(out)
}

/// Combine identifier parts into a stable cache key
pub fn cache_key<I, P>(parts: I) -> CacheKey
where
    I: IntoIterator<Item = P>,
    P: fmt::Display,
{
    let parts: Vec<String> = parts.into_iter().map(|part| part.to_string()).collect();
    join_parts(parts.iter().map(|part| Some(part.as_str())))
}

/// Key of an entry for a resource, e.g. `cache_key(42, K1)`
///
/// Without a lookup key the resource gets its own "no key" slot, distinct
/// from any real key, including one spelled `None`.
pub fn entry_key(resource_id: &str, lookup_key: Option<&CacheKey>) -> CacheKey {
    join_parts([Some(resource_id), lookup_key.map(CacheKey::as_str)])
}

/// Indirection key scoping a resolved key to one session, tab and resource
pub fn contextual_key(session_id: &str, tab_id: Option<u32>, resource_id: &str) -> CacheKey {
    let tab = tab_id.map(|t| t.to_string());
    join_parts([Some(session_id), tab.as_deref(), Some(resource_id)])
}

/// Mint an unpredictable key suitable for sharing (122 random bits)
pub fn random_key() -> CacheKey {
    CacheKey(Uuid::new_v4().simple().to_string())
}
