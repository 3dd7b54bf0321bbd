//! Tower middleware resolving and attaching the tenant context.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::response::{IntoResponse, Response};
use futures::future::BoxFuture;
use http::{HeaderMap, HeaderName, Request};
use tessera_core::tenant::{
    PoolFactory, RequestScope, TenantId, TenantResolver, TenantStore, with_request_scope,
};
use tessera_core::{TenantError, TenantResult};
use tower_layer::Layer;
use tower_service::Service;
use tracing::{debug, info};

use crate::error::TenantRejection;

/// Tower layer resolving each request's tenant before the handler runs.
///
/// The identifier is read from the configured tenant header. On success the
/// [`ResolvedContext`](tessera_core::tenant::ResolvedContext) is inserted into
/// the request extensions and the tenant's [`RequestScope`] is set for the
/// duration of the inner service call. On failure the request is answered
/// with a [`TenantRejection`] and the inner service is never called.
///
/// # Example
///
/// ```rust,ignore
/// use axum::{Router, routing::get};
/// use tessera_axum::{Tenant, TenantLayer};
///
/// async fn handler(Tenant(ctx): Tenant<PgPool>) -> String {
///     format!("{:?}", ctx.tenant_id())
/// }
///
/// let app = Router::new()
///     .route("/rows", get(handler))
///     .layer(TenantLayer::new(resolver)?);
/// ```
pub struct TenantLayer<F: PoolFactory, S> {
    resolver: Arc<TenantResolver<F, S>>,
    header: HeaderName,
}

impl<F, S> TenantLayer<F, S>
where
    F: PoolFactory,
    S: TenantStore<F::Pool>,
{
    /// Create a layer reading the header named in the resolver's configuration.
    pub fn new(resolver: Arc<TenantResolver<F, S>>) -> TenantResult<Self> {
        let name = resolver.config().tenant_header.to_ascii_lowercase();
        let header = HeaderName::try_from(name.as_str()).map_err(|e| {
            TenantError::config(format!("invalid tenant header '{}': {}", name, e))
        })?;

        info!(header = %header, mode = %resolver.mode(), "TenantLayer created");
        Ok(Self { resolver, header })
    }

    /// Get the resolver.
    pub fn resolver(&self) -> &Arc<TenantResolver<F, S>> {
        &self.resolver
    }

    /// Get the tenant header name.
    pub fn header(&self) -> &HeaderName {
        &self.header
    }
}

impl<F: PoolFactory, S> Clone for TenantLayer<F, S> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            header: self.header.clone(),
        }
    }
}

impl<Svc, F: PoolFactory, S> Layer<Svc> for TenantLayer<F, S> {
    type Service = TenantMiddleware<Svc, F, S>;

    fn layer(&self, inner: Svc) -> Self::Service {
        TenantMiddleware {
            inner,
            resolver: self.resolver.clone(),
            header: self.header.clone(),
        }
    }
}

/// Tower middleware service produced by [`TenantLayer`].
pub struct TenantMiddleware<Svc, F: PoolFactory, S> {
    inner: Svc,
    resolver: Arc<TenantResolver<F, S>>,
    header: HeaderName,
}

impl<Svc: Clone, F: PoolFactory, S> Clone for TenantMiddleware<Svc, F, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            resolver: self.resolver.clone(),
            header: self.header.clone(),
        }
    }
}

impl<Svc, F, S, ReqBody> Service<Request<ReqBody>> for TenantMiddleware<Svc, F, S>
where
    Svc: Service<Request<ReqBody>, Response = Response> + Clone + Send + 'static,
    Svc::Future: Send + 'static,
    F: PoolFactory,
    S: TenantStore<F::Pool> + 'static,
    ReqBody: Send + 'static,
{
    type Response = Response;
    type Error = Svc::Error;
    type Future = BoxFuture<'static, Result<Response, Svc::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<ReqBody>) -> Self::Future {
        // the clone may not be ready; call the instance poll_ready was called on
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let resolver = self.resolver.clone();
        let header = self.header.clone();

        Box::pin(async move {
            let tenant_id = match tenant_id_from_headers(request.headers(), &header) {
                Ok(id) => id,
                Err(rejection) => return Ok(rejection.into_response()),
            };

            let ctx = match resolver.resolve(tenant_id.as_ref()).await {
                Ok(ctx) => ctx,
                Err(err) => return Ok(TenantRejection::from(err).into_response()),
            };

            debug!(
                tenant_id = ?ctx.tenant_id().map(TenantId::as_str),
                pool = ?ctx.pool_key(),
                "Attached tenant context"
            );

            let scope = RequestScope::from(&ctx);
            request.extensions_mut().insert(ctx);
            with_request_scope(scope, inner.call(request)).await
        })
    }
}

/// Read the tenant identifier from `headers`.
///
/// A missing or blank header means no identifier.
pub fn tenant_id_from_headers(
    headers: &HeaderMap,
    header: &HeaderName,
) -> Result<Option<TenantId>, TenantRejection> {
    let Some(value) = headers.get(header) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| TenantRejection::InvalidHeader(header.to_string()))?
        .trim();

    if value.is_empty() {
        Ok(None)
    } else {
        Ok(Some(TenantId::new(value)))
    }
}
