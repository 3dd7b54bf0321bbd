//! Request-scoped tenant metadata using task-local storage.
//!
//! The HTTP layer hands the full [`ResolvedContext`](super::ResolvedContext)
//! to handlers through request extensions. Code further down the call stack
//! that only needs to know *which* tenant it is serving can read the
//! [`RequestScope`] from a Tokio task-local instead of threading it through
//! every signature. The scope lives exactly as long as the request future and
//! is invisible to other requests.
//!
//! # Example
//!
//! ```rust
//! use tessera_core::tenant::{current_tenant_id, with_request_scope, RequestScope};
//! use tessera_core::tenant::InstanceMode;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let scope = RequestScope::new(InstanceMode::ControlPlane).with_tenant("tenant-123");
//!
//! let seen = with_request_scope(scope, async { current_tenant_id() }).await;
//! assert_eq!(seen.unwrap().as_str(), "tenant-123");
//! assert!(current_tenant_id().is_none());
//! # }
//! ```

use std::future::Future;

use super::context::{ResolvedContext, TenantId};
use super::mode::InstanceMode;

tokio::task_local! {
    /// Task-local request scope.
    static REQUEST_SCOPE: RequestScope;
}

/// The tenant-identifying part of a resolved context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestScope {
    /// The process mode.
    pub mode: InstanceMode,
    /// The tenant the request addressed.
    pub tenant_id: Option<TenantId>,
    /// The cache key of the pool the request uses.
    pub pool_key: Option<String>,
}

impl RequestScope {
    /// A scope without a tenant.
    pub fn new(mode: InstanceMode) -> Self {
        Self {
            mode,
            tenant_id: None,
            pool_key: None,
        }
    }

    /// Set the tenant.
    pub fn with_tenant(mut self, tenant_id: impl Into<TenantId>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Set the pool key.
    pub fn with_pool_key(mut self, key: impl Into<String>) -> Self {
        self.pool_key = Some(key.into());
        self
    }
}

impl<P> From<&ResolvedContext<P>> for RequestScope {
    fn from(ctx: &ResolvedContext<P>) -> Self {
        Self {
            mode: ctx.mode(),
            tenant_id: ctx.tenant_id().cloned(),
            pool_key: ctx.pool_key().map(str::to_string),
        }
    }
}

/// Run `f` with `scope` as the current request scope.
pub async fn with_request_scope<F, T>(scope: RequestScope, f: F) -> T
where
    F: Future<Output = T>,
{
    REQUEST_SCOPE.scope(scope, f).await
}

/// Get the current request scope if set.
#[inline]
pub fn current_scope() -> Option<RequestScope> {
    REQUEST_SCOPE.try_with(|scope| scope.clone()).ok()
}

/// Get the current tenant ID if set.
#[inline]
pub fn current_tenant_id() -> Option<TenantId> {
    REQUEST_SCOPE
        .try_with(|scope| scope.tenant_id.clone())
        .ok()
        .flatten()
}

/// Get the current pool key if set.
#[inline]
pub fn current_pool_key() -> Option<String> {
    REQUEST_SCOPE
        .try_with(|scope| scope.pool_key.clone())
        .ok()
        .flatten()
}

/// Require a tenant, returning an error if the request has none.
#[inline]
pub fn require_tenant() -> Result<TenantId, TenantNotSetError> {
    current_tenant_id().ok_or(TenantNotSetError)
}

/// Error returned when a tenant is required but the request has none.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("tenant context not set")]
pub struct TenantNotSetError;
