//! Request context: tenant identity and cooperative cancellation
//!
//! Every search operation receives a [`QueryContext`]. Dispatchers derive a
//! child context per request so that reaching a result limit can cancel
//! sibling work without touching the caller's context. Cancellation is a
//! one-way latch observed through the token chain: cancelling a parent
//! cancels all children, cancelling a child leaves the parent alone.

use crate::error::{QueryError, QueryResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

struct TokenInner {
    cancelled: AtomicBool,
    parent: Option<CancelToken>,
}

/// One-way cancellation latch with parent links
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<TokenInner>,
}

impl CancelToken {
    /// Create a root token
    pub fn new() -> Self {
        CancelToken {
            inner: Arc::new(TokenInner {
                cancelled: AtomicBool::new(false),
                parent: None,
            }),
        }
    }

    /// Derive a child token. The child observes this token's cancellation;
    /// cancelling the child does not affect this token.
    pub fn child(&self) -> Self {
        CancelToken {
            inner: Arc::new(TokenInner {
                cancelled: AtomicBool::new(false),
                parent: Some(self.clone()),
            }),
        }
    }

    /// Latch this token cancelled
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
    }

    /// Check this token and every ancestor
    pub fn is_cancelled(&self) -> bool {
        if self.inner.cancelled.load(Ordering::Acquire) {
            return true;
        }
        match &self.inner.parent {
            Some(parent) => parent.is_cancelled(),
            None => false,
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Cancels its token when dropped
///
/// Dispatchers hold one of these for the lifetime of a request so the
/// derived context is cancelled on every return path.
pub struct CancelGuard(CancelToken);

impl CancelGuard {
    /// Guard the given token
    pub fn new(token: CancelToken) -> Self {
        CancelGuard(token)
    }
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// Per-request context carried through every search operation
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    tenant: Option<String>,
    cancel: CancelToken,
}

impl QueryContext {
    /// Context with no tenant identity
    pub fn new() -> Self {
        Self::default()
    }

    /// Context carrying a tenant identity
    pub fn for_tenant(tenant: impl Into<String>) -> Self {
        QueryContext {
            tenant: Some(tenant.into()),
            cancel: CancelToken::new(),
        }
    }

    /// The tenant identity, or `TenantRequired` if none was attached
    pub fn tenant(&self) -> QueryResult<&str> {
        self.tenant.as_deref().ok_or(QueryError::TenantRequired)
    }

    /// Derive a child context with its own cancellation token
    pub fn child(&self) -> QueryContext {
        QueryContext {
            tenant: self.tenant.clone(),
            cancel: self.cancel.child(),
        }
    }

    /// The context's cancellation token
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Latch this context cancelled
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Check cancellation of this context and its ancestors
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_required() {
        let ctx = QueryContext::new();
        assert!(matches!(ctx.tenant(), Err(QueryError::TenantRequired)));

        let ctx = QueryContext::for_tenant("tenant-1");
        assert_eq!(ctx.tenant().unwrap(), "tenant-1");
    }

    #[test]
    fn test_child_keeps_tenant() {
        let ctx = QueryContext::for_tenant("tenant-1");
        assert_eq!(ctx.child().tenant().unwrap(), "tenant-1");
    }

    #[test]
    fn test_parent_cancellation_reaches_child() {
        let parent = QueryContext::for_tenant("t");
        let child = parent.child();
        assert!(!child.is_cancelled());
        parent.cancel();
        assert!(child.is_cancelled());
    }

    #[test]
    fn test_child_cancellation_does_not_reach_parent() {
        let parent = QueryContext::for_tenant("t");
        let child = parent.child();
        child.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());
    }

    #[test]
    fn test_cancel_guard_cancels_on_drop() {
        let ctx = QueryContext::new();
        {
            let _guard = CancelGuard::new(ctx.cancel_token().clone());
            assert!(!ctx.is_cancelled());
        }
        assert!(ctx.is_cancelled());
    }

    #[test]
    fn test_clone_shares_token() {
        let ctx = QueryContext::new();
        let other = ctx.clone();
        other.cancel();
        assert!(ctx.is_cancelled());
    }
}
