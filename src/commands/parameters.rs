//! Parameters shared by every temporary cache command

use crate::context::RequestContext;
use crate::error::{TempCacheError, TempCacheResult};
use crate::keys::CacheKey;

/// Input to a temporary cache command
#[derive(Debug, Clone)]
pub struct CommandParameters {
    /// Acting user and session
    pub context: RequestContext,

    /// Dashboard, chart or dataset the state belongs to
    pub resource_id: String,

    /// Key returned by an earlier create or update
    pub key: Option<CacheKey>,

    /// Browser tab id; absent or 0 means the caller is not tab scoped
    pub tab_id: Option<u32>,

    /// Serialized state to store
    pub value: Option<String>,
}

impl CommandParameters {
    pub fn new(context: RequestContext, resource_id: impl Into<String>) -> Self {
        Self {
            context,
            resource_id: resource_id.into(),
            key: None,
            tab_id: None,
            value: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<CacheKey>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_tab(mut self, tab_id: u32) -> Self {
        self.tab_id = Some(tab_id);
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Whether a stored key may be reused for this tab
    pub(crate) fn is_tab_scoped(&self) -> bool {
        self.tab_id.is_some_and(|tab| tab != 0)
    }

    pub(crate) fn require_value(&self) -> TempCacheResult<&str> {
        self.value
            .as_deref()
            .ok_or_else(|| TempCacheError::InvalidParameters("value is required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> CommandParameters {
        CommandParameters::new(RequestContext::new("alice", "s1"), "42")
    }

    #[test]
    fn tab_zero_is_not_scoped() {
        assert!(!params().is_tab_scoped());
        assert!(!params().with_tab(0).is_tab_scoped());
        assert!(params().with_tab(5).is_tab_scoped());
    }

    #[test]
    fn value_is_required() {
        assert!(matches!(
            params().require_value(),
            Err(TempCacheError::InvalidParameters(_))
        ));
        assert_eq!(params().with_value("x").require_value().unwrap(), "x");
    }
}
