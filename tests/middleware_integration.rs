//! Integration tests for the HTTP layer.
//!
//! These tests verify that every request gets its own resolved context, that
//! resolution failures are answered before the handler runs, and that the
//! tenant header is configurable.

mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use common::{CountingFactory, FakePool, control_plane, data_plane, studio};
use tessera::prelude::*;
use tessera::tenant::current_tenant_id;
use tower::ServiceExt;

async fn whoami(Tenant(ctx): Tenant<FakePool>) -> String {
    let scoped = current_tenant_id().map(|id| id.into_inner());
    format!(
        "{}|{}|{}",
        ctx.tenant_id().map(|id| id.as_str()).unwrap_or("-"),
        ctx.pool().map(|p| p.connection_string()).unwrap_or("-"),
        scoped.as_deref().unwrap_or("-"),
    )
}

async fn secret(tenant: RequiredTenant<FakePool>) -> String {
    tenant.signing_secret().unwrap_or("-").to_string()
}

fn router(studio: &Studio<CountingFactory, tessera::tenant::MemoryStore>) -> Router {
    Router::new()
        .route("/whoami", get(whoami))
        .route("/secret", get(secret))
        .layer(studio.layer().unwrap())
}

async fn call(app: &Router, uri: &str, headers: &[(&str, &str)]) -> (StatusCode, String) {
    let mut request = Request::builder().uri(uri);
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    let response = app
        .clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

/// Test that each request sees its own tenant
#[tokio::test]
async fn test_requests_see_their_own_tenant() {
    let studio = studio(CountingFactory::new(), control_plane());
    let app = router(&studio);

    let (status, body) = call(&app, "/whoami", &[("x-project-id", "t1")]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "t1|db://a|t1");

    let (_, body) = call(&app, "/whoami", &[("x-project-id", "t2")]).await;
    assert_eq!(body, "t2|db://b|t2");

    let (_, body) = call(&app, "/whoami", &[]).await;
    assert_eq!(body, "-|-|-");
}

/// Test that concurrent requests for different tenants never mix contexts
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_are_isolated() {
    let studio = studio(CountingFactory::new(), control_plane());
    let app = router(&studio);

    let mut handles = Vec::new();
    for i in 0..40 {
        let app = app.clone();
        let (tenant, expected) = if i % 2 == 0 {
            ("t1", "t1|db://a|t1")
        } else {
            ("t2", "t2|db://b|t2")
        };
        handles.push(tokio::spawn(async move {
            let (_, body) = call(&app, "/whoami", &[("x-project-id", tenant)]).await;
            assert_eq!(body, expected);
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(studio.cache().keys(), vec!["system", "t1", "t2"]);
}

/// Test that resolution failures map to distinct statuses
#[tokio::test]
async fn test_failures_are_answered_by_the_layer() {
    let studio = studio(CountingFactory::new(), control_plane());
    let app = router(&studio);

    let (status, body) = call(&app, "/whoami", &[("x-project-id", "ghost")]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.starts_with("T2001"));

    let (status, body) = call(&app, "/whoami", &[("x-project-id", "down")]).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(!body.contains("db://unreachable"));

    let (status, _) = call(&app, "/secret", &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Test that a data plane answers with its own database for any header
#[tokio::test]
async fn test_data_plane_ignores_tenant_header() {
    let studio = studio(CountingFactory::new(), data_plane());
    let app = router(&studio);

    let (status, body) = call(&app, "/whoami", &[("x-project-id", "system")]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "-|db://self|-");

    let (_, body) = call(&app, "/secret", &[]).await;
    assert_eq!(body, "own-secret");
}

/// Test that the tenant header name comes from configuration
#[tokio::test]
async fn test_custom_tenant_header() {
    let studio = studio(
        CountingFactory::new(),
        control_plane().with_tenant_header("X-Tenant"),
    );
    let app = router(&studio);

    let (_, body) = call(&app, "/whoami", &[("x-tenant", "t1")]).await;
    assert_eq!(body, "t1|db://a|t1");

    let (_, body) = call(&app, "/whoami", &[("x-project-id", "t1")]).await;
    assert_eq!(body, "-|-|-");
}

/// Test that handlers without the layer get a server error
#[tokio::test]
async fn test_missing_layer() {
    let app = Router::new().route("/whoami", get(whoami));

    let (status, body) = call(&app, "/whoami", &[]).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "tenant context not attached");
}
