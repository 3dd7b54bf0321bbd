//! Handler extractors for the attached tenant context.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use http::request::Parts;
use tessera_core::tenant::{PoolEntry, ResolvedContext, TenantPool};

use crate::error::TenantRejection;

/// The request's resolved context, whatever it holds.
///
/// Rejects with `500` if [`TenantLayer`](crate::TenantLayer) is not installed
/// for the route.
///
/// # Example
///
/// ```rust,ignore
/// use tessera_axum::Tenant;
///
/// async fn handler(Tenant(ctx): Tenant<PgPool>) -> String {
///     match ctx.tenant_id() {
///         Some(id) => id.to_string(),
///         None => "no tenant".to_string(),
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Tenant<P>(pub ResolvedContext<P>);

impl<S, P> FromRequestParts<S> for Tenant<P>
where
    S: Send + Sync,
    P: TenantPool,
{
    type Rejection = TenantRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ResolvedContext<P>>()
            .cloned()
            .map(Tenant)
            .ok_or(TenantRejection::MissingContext)
    }
}

/// A resolved context that is guaranteed to carry a pool.
///
/// On a control plane, requests without a tenant identifier resolve to an
/// empty context; this extractor rejects them with `400`.
#[derive(Debug, Clone)]
pub struct RequiredTenant<P> {
    /// The pool serving the request.
    pub entry: Arc<PoolEntry<P>>,
    /// The full context.
    pub context: ResolvedContext<P>,
}

impl<P> RequiredTenant<P> {
    /// The pool serving the request.
    pub fn pool(&self) -> &P {
        self.entry.pool()
    }

    /// The signing secret for the request's tenant.
    pub fn signing_secret(&self) -> Option<&str> {
        self.context.signing_secret()
    }
}

impl<S, P> FromRequestParts<S> for RequiredTenant<P>
where
    S: Send + Sync,
    P: TenantPool,
{
    type Rejection = TenantRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Tenant(context) = Tenant::<P>::from_request_parts(parts, state).await?;
        match context.pool_entry().cloned() {
            Some(entry) => Ok(Self { entry, context }),
            None => Err(TenantRejection::MissingTenant),
        }
    }
}
