//! # Tessera
//!
//! Tenant context resolution and connection pool lifecycle for a multi-tenant
//! backend studio.
//!
//! Tessera provides:
//! - A process-wide instance mode: a shared control plane serving many
//!   tenants, or a dedicated data plane serving one
//! - A single-flight cache owning every tenant database pool
//! - Per-request resolution of the tenant's pool and signing secret
//! - Axum middleware attaching the result to each request
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use tessera::prelude::*;
//!
//! async fn rows(tenant: RequiredTenant<PgPool>) -> String {
//!     let conn = tenant.pool().get().await.unwrap();
//!     // ...
//!     "ok".to_string()
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tessera::TenantError> {
//!     tessera::logging::init();
//!
//!     let studio = Studio::from_env()?;
//!     studio.warm_up().await?;
//!
//!     let app = Router::new()
//!         .route("/rows", get(rows))
//!         .layer(studio.layer()?);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//!
//!     studio.shutdown();
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod studio;

pub use studio::Studio;

/// Mode gate, pool cache, resolver and request scope.
pub mod tenant {
    pub use tessera_core::tenant::*;
}

/// Process configuration.
pub mod config {
    pub use tessera_core::config::*;
}

/// Logging setup.
pub mod logging {
    pub use tessera_core::logging::*;
}

/// Axum integration.
pub mod web {
    pub use tessera_axum::*;
}

/// PostgreSQL backend.
#[cfg(feature = "postgres")]
#[cfg_attr(docsrs, doc(cfg(feature = "postgres")))]
pub mod postgres {
    pub use tessera_postgres::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::Studio;
    pub use tessera_axum::prelude::*;
    pub use tessera_core::prelude::*;
    #[cfg(feature = "postgres")]
    pub use tessera_postgres::prelude::*;
}

// Re-export key types at the crate root
pub use tessera_core::{ErrorCode, InstanceConfig, TenantError, TenantResult};
