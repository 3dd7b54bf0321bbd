//! # tessera-core
//!
//! Tenant context resolution for a multi-tenant backend.
//!
//! One codebase runs in two deployment modes:
//!
//! - **Control plane**: a shared process serving many tenants. Each request
//!   names its tenant; the process looks the tenant up in a registry database
//!   and routes the request to that tenant's own database pool.
//! - **Data plane**: a dedicated process serving a single tenant. It connects
//!   only to that tenant's database and must never touch the registry.
//!
//! This crate is driver and framework agnostic. Database drivers implement
//! [`tenant::PoolFactory`] and [`tenant::TenantStore`]; HTTP frameworks call
//! [`tenant::TenantResolver::resolve`] once per request.
//!
//! ## Modes
//!
//! ```rust
//! use tessera_core::tenant::{InstanceMode, ModeGate};
//!
//! let gate = ModeGate::new("DATA_PLANE".parse().unwrap());
//! assert_eq!(gate.mode(), InstanceMode::DataPlane);
//! assert!(gate.assert_system_access_allowed().is_err());
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use tessera_core::config::{InstanceConfig, MapEnvSource};
//!
//! let env = MapEnvSource::new()
//!     .set("INSTANCE_MODE", "CONTROL_PLANE")
//!     .set("DATABASE_URL", "postgres://localhost/registry");
//! let config = InstanceConfig::from_source(&env).unwrap();
//! assert_eq!(config.tenant_header, "x-project-id");
//! ```

#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod logging;
pub mod tenant;

pub use config::InstanceConfig;
pub use error::{ErrorCode, TenantError, TenantResult};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::InstanceConfig;
    pub use crate::error::{TenantError, TenantResult};
    pub use crate::tenant::{
        InstanceMode, ModeGate, PoolCache, PoolFactory, PoolOptions, ResolvedContext, TenantId,
        TenantPool, TenantRecord, TenantResolver, TenantStore,
    };
}
