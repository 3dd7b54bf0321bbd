//! # tessera-postgres
//!
//! PostgreSQL backend for Tessera.
//!
//! This crate provides:
//! - [`PgPool`], a `deadpool-postgres` pool that verifies its database on
//!   creation and drops idle connections in the background
//! - [`PgPoolFactory`], the [`PoolFactory`](tessera_core::tenant::PoolFactory)
//!   the tenant pool cache builds pools with
//! - [`PgTenantStore`], the registry lookup run through the system pool
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tessera_core::InstanceConfig;
//! use tessera_core::tenant::{ModeGate, PoolCache, TenantResolver};
//! use tessera_postgres::{PgPoolFactory, PgTenantStore};
//!
//! let config = InstanceConfig::from_env()?;
//! let cache = Arc::new(PoolCache::new(PgPoolFactory::new(), ModeGate::new(config.mode)));
//! let resolver = TenantResolver::new(cache, Arc::new(PgTenantStore::new()), config)?;
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod factory;
pub mod pool;
pub mod store;

pub use config::PgConfig;
pub use connection::PgConnection;
pub use error::{PgError, PgResult};
pub use factory::PgPoolFactory;
pub use pool::PgPool;
pub use store::{DEFAULT_REGISTRY_TABLE, PgTenantStore};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::PgConfig;
    pub use crate::error::{PgError, PgResult};
    pub use crate::factory::PgPoolFactory;
    pub use crate::pool::PgPool;
    pub use crate::store::PgTenantStore;
}
