//! Tenant context resolution and pool lifecycle.
//!
//! A control-plane process serves requests for any tenant in its registry; a
//! data-plane process serves exactly one tenant and must never reach the
//! registry. This module holds the pieces that make that work:
//!
//! - [`ModeGate`]: the process mode, consulted before every registry access
//! - [`PoolCache`]: the single owner of every live pool, single-flight per key
//! - [`TenantResolver`]: turns a request's optional tenant id into a
//!   [`ResolvedContext`]
//! - [`with_request_scope`]: task-local request metadata for deep call sites
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tessera_core::InstanceConfig;
//! use tessera_core::tenant::{MemoryStore, ModeGate, PoolCache, TenantId, TenantResolver};
//!
//! let config = InstanceConfig::from_env()?;
//! let cache = Arc::new(PoolCache::new(factory, ModeGate::new(config.mode)));
//! let resolver = TenantResolver::new(cache, Arc::new(MemoryStore::new()), config)?;
//!
//! let ctx = resolver.resolve(Some(&TenantId::new("tenant-123"))).await?;
//! let pool = ctx.pool().expect("tenant pool");
//! ```

mod context;
mod mode;
mod pool;
mod record;
mod resolver;
mod task_local;

pub use context::{ResolvedContext, TenantId};
pub use mode::{InstanceMode, ModeGate, SECURITY_TARGET};
pub use pool::{
    CURRENT_KEY, CacheStats, DEFAULT_CREATE_TIMEOUT, DEFAULT_CURRENT_MAX_CONNECTIONS,
    DEFAULT_SYSTEM_MAX_CONNECTIONS, DEFAULT_TENANT_MAX_CONNECTIONS, PoolCache, PoolEntry,
    PoolFactory, PoolOptions, PoolSpec, SYSTEM_KEY, TenantPool, is_reserved_key,
    redact_connection_string,
};
pub use record::{MemoryStore, SYSTEM_INTERNAL, TenantRecord, TenantStore};
pub use resolver::TenantResolver;
pub use task_local::{
    RequestScope, TenantNotSetError, current_pool_key, current_scope, current_tenant_id,
    require_tenant, with_request_scope,
};
