//! Tenant identifiers and the per-request resolved context.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::mode::InstanceMode;
use super::pool::PoolEntry;

/// A unique identifier for a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Create a new tenant ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the tenant ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TenantId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TenantId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&TenantId> for TenantId {
    fn from(id: &TenantId) -> Self {
        id.clone()
    }
}

impl From<uuid::Uuid> for TenantId {
    fn from(u: uuid::Uuid) -> Self {
        Self::new(u.to_string())
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// What one request resolved to.
///
/// Built fresh by the resolver for every request and never changed after
/// that: the fields are private and only readable. The pool handle is shared
/// with the cache, which keeps ownership of the pool.
pub struct ResolvedContext<P> {
    mode: InstanceMode,
    pool: Option<Arc<PoolEntry<P>>>,
    signing_secret: Option<String>,
    tenant_id: Option<TenantId>,
}

impl<P> ResolvedContext<P> {
    /// A context without a tenant, for control-plane-only requests.
    pub fn empty(mode: InstanceMode) -> Self {
        Self {
            mode,
            pool: None,
            signing_secret: None,
            tenant_id: None,
        }
    }

    pub(crate) fn resolved(
        mode: InstanceMode,
        pool: Arc<PoolEntry<P>>,
        signing_secret: Option<String>,
        tenant_id: Option<TenantId>,
    ) -> Self {
        Self {
            mode,
            pool: Some(pool),
            signing_secret,
            tenant_id,
        }
    }

    /// The mode of the process that resolved this context.
    pub fn mode(&self) -> InstanceMode {
        self.mode
    }

    /// The pool the request must use, if any.
    pub fn pool(&self) -> Option<&P> {
        self.pool.as_deref().map(PoolEntry::pool)
    }

    /// The cache entry behind [`pool`](Self::pool).
    pub fn pool_entry(&self) -> Option<&Arc<PoolEntry<P>>> {
        self.pool.as_ref()
    }

    /// The cache key of the resolved pool.
    pub fn pool_key(&self) -> Option<&str> {
        self.pool.as_deref().map(PoolEntry::key)
    }

    /// The secret for verifying and issuing this tenant's tokens.
    pub fn signing_secret(&self) -> Option<&str> {
        self.signing_secret.as_deref()
    }

    /// The tenant the request addressed, if any.
    pub fn tenant_id(&self) -> Option<&TenantId> {
        self.tenant_id.as_ref()
    }

    /// Whether the context carries a pool.
    pub fn has_pool(&self) -> bool {
        self.pool.is_some()
    }
}

impl<P> Clone for ResolvedContext<P> {
    fn clone(&self) -> Self {
        Self {
            mode: self.mode,
            pool: self.pool.clone(),
            signing_secret: self.signing_secret.clone(),
            tenant_id: self.tenant_id.clone(),
        }
    }
}

impl<P> fmt::Debug for ResolvedContext<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedContext")
            .field("mode", &self.mode)
            .field("pool_key", &self.pool_key())
            .field("tenant_id", &self.tenant_id)
            .field(
                "signing_secret",
                &self.signing_secret.as_ref().map(|_| "***"),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_id_creation() {
        let id1 = TenantId::new("tenant-123");
        assert_eq!(id1.as_str(), "tenant-123");

        let id2: TenantId = "tenant-456".into();
        assert_eq!(id2.to_string(), "tenant-456");

        let uuid = uuid::Uuid::nil();
        let id3: TenantId = uuid.into();
        assert_eq!(id3.as_str(), "00000000-0000-0000-0000-000000000000");
    }

    #[test]
    fn test_empty_context() {
        let ctx: ResolvedContext<()> = ResolvedContext::empty(InstanceMode::ControlPlane);
        assert!(!ctx.has_pool());
        assert!(ctx.pool().is_none());
        assert!(ctx.signing_secret().is_none());
        assert!(ctx.tenant_id().is_none());
    }

    #[test]
    fn test_debug_hides_secret() {
        let mut ctx: ResolvedContext<()> = ResolvedContext::empty(InstanceMode::DataPlane);
        ctx.signing_secret = Some("top-secret".to_string());

        let rendered = format!("{:?}", ctx);
        assert!(!rendered.contains("top-secret"));
        assert!(rendered.contains("***"));
    }
}
