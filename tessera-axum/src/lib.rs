//! Axum integration for Tessera.
//!
//! Every request passes through [`TenantLayer`], which reads the tenant
//! header, resolves the tenant's pool and signing secret, and attaches the
//! result to the request. Handlers pick it up with the [`Tenant`] or
//! [`RequiredTenant`] extractors.
//!
//! Resolution failures never reach the handler. They are answered directly:
//!
//! | Failure | Status |
//! |---|---|
//! | registry access from a data plane | 403 |
//! | unknown tenant | 404 |
//! | pool creation failed | 503 |
//! | registry query failed | 502 |
//! | lookup or creation timed out | 504 |
//! | configuration error | 500 |
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use axum::{Router, routing::get};
//! use tessera_axum::{RequiredTenant, TenantLayer};
//! use tessera_postgres::PgPool;
//!
//! async fn rows(tenant: RequiredTenant<PgPool>) -> String {
//!     let conn = tenant.pool().get().await.unwrap();
//!     // ...
//!     "ok".to_string()
//! }
//!
//! let app = Router::new()
//!     .route("/rows", get(rows))
//!     .layer(TenantLayer::new(Arc::new(resolver))?);
//! ```

mod error;
mod extract;
mod layer;

pub use error::{TenantRejection, status_for};
pub use extract::{RequiredTenant, Tenant};
pub use layer::{TenantLayer, TenantMiddleware, tenant_id_from_headers};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{RequiredTenant, Tenant, TenantLayer, TenantMiddleware, TenantRejection};
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::Router;
    use axum::body::Body;
    use axum::routing::get;
    use http::{Request, StatusCode};
    use std::sync::Arc;
    use tessera_core::InstanceConfig;
    use tessera_core::tenant::{
        InstanceMode, MemoryStore, ModeGate, PoolCache, PoolFactory, PoolOptions, TenantPool,
        TenantRecord, TenantResolver, current_tenant_id,
    };
    use tower::ServiceExt;

    struct FakePool(String);

    impl TenantPool for FakePool {
        fn connection_string(&self) -> &str {
            &self.0
        }
    }

    struct FakeFactory;

    #[async_trait]
    impl PoolFactory for FakeFactory {
        type Pool = FakePool;
        type Error = String;

        async fn create(&self, options: &PoolOptions) -> Result<FakePool, String> {
            if options.connection_string.contains("unreachable") {
                return Err("connection refused".to_string());
            }
            Ok(FakePool(options.connection_string.clone()))
        }
    }

    fn app(mode: InstanceMode) -> Router {
        let store: MemoryStore = [
            TenantRecord::new("t1", "db://a", "s1"),
            TenantRecord::new("down", "db://unreachable", "s2"),
        ]
        .into_iter()
        .collect();
        let cache = Arc::new(PoolCache::new(FakeFactory, ModeGate::new(mode)));
        let config = InstanceConfig::new(mode, "db://registry").with_signing_secret("own");
        let resolver = Arc::new(TenantResolver::new(cache, Arc::new(store), config).unwrap());

        Router::new()
            .route(
                "/",
                get(|Tenant(ctx): Tenant<FakePool>| async move {
                    ctx.pool()
                        .map(|pool| pool.connection_string().to_string())
                        .unwrap_or_else(|| "none".to_string())
                }),
            )
            .route(
                "/scope",
                get(|| async {
                    current_tenant_id()
                        .map(|id| id.into_inner())
                        .unwrap_or_default()
                }),
            )
            .route(
                "/required",
                get(|tenant: RequiredTenant<FakePool>| async move {
                    tenant.signing_secret().unwrap_or_default().to_string()
                }),
            )
            .layer(TenantLayer::new(resolver).unwrap())
    }

    async fn send(app: Router, uri: &str, tenant: Option<&str>) -> (StatusCode, String) {
        let mut request = Request::builder().uri(uri);
        if let Some(tenant) = tenant {
            request = request.header("x-project-id", tenant);
        }
        let response = app
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_tenant_pool_attached() {
        let (status, body) = send(app(InstanceMode::ControlPlane), "/", Some("t1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "db://a");
    }

    #[tokio::test]
    async fn test_no_tenant_reaches_handler_with_empty_context() {
        let (status, body) = send(app(InstanceMode::ControlPlane), "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "none");
    }

    #[tokio::test]
    async fn test_task_local_scope_set_for_handler() {
        let (status, body) = send(app(InstanceMode::ControlPlane), "/scope", Some("t1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "t1");
    }

    #[tokio::test]
    async fn test_required_tenant() {
        let router = app(InstanceMode::ControlPlane);
        let (status, body) = send(router.clone(), "/required", Some("t1")).await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "s1"));

        let (status, _) = send(router, "/required", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_failures_mapped_to_status() {
        let router = app(InstanceMode::ControlPlane);

        let (status, body) = send(router.clone(), "/", Some("ghost")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("T2001"));

        let (status, body) = send(router, "/", Some("down")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!body.contains("unreachable"));
    }

    #[tokio::test]
    async fn test_data_plane_serves_own_database() {
        let (status, body) = send(app(InstanceMode::DataPlane), "/required", Some("system")).await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "own"));
    }
}
