//! Per-request tenant resolution.
//!
//! Resolution depends on the process mode and the tenant identifier a request
//! carries:
//!
//! | Mode | Identifier | Result |
//! |---|---|---|
//! | data plane | ignored | the `"current"` pool and the configured secret |
//! | control plane | none | an empty context |
//! | control plane | `"system"` | the registry pool, no registry query |
//! | control plane | cached id | the cached pool, no registry query |
//! | control plane | other id | registry lookup, then a new tenant pool |

use std::sync::Arc;
use tracing::debug;

use super::context::{ResolvedContext, TenantId};
use super::mode::InstanceMode;
use super::pool::{
    CURRENT_KEY, PoolCache, PoolEntry, PoolFactory, PoolOptions, PoolSpec, SYSTEM_KEY,
};
use super::record::TenantStore;
use crate::config::InstanceConfig;
use crate::error::{TenantError, TenantResult};

/// Turns a request's optional tenant identifier into a [`ResolvedContext`].
pub struct TenantResolver<F: PoolFactory, S> {
    cache: Arc<PoolCache<F>>,
    store: Arc<S>,
    config: Arc<InstanceConfig>,
}

impl<F, S> TenantResolver<F, S>
where
    F: PoolFactory,
    S: TenantStore<F::Pool>,
{
    /// Create a resolver.
    ///
    /// Fails if the cache's gate and the configuration disagree on the mode.
    pub fn new(
        cache: Arc<PoolCache<F>>,
        store: Arc<S>,
        config: InstanceConfig,
    ) -> TenantResult<Self> {
        if cache.gate().mode() != config.mode {
            return Err(TenantError::config(format!(
                "pool cache gate is {} but configuration says {}",
                cache.gate().mode(),
                config.mode
            )));
        }

        Ok(Self {
            cache,
            store,
            config: Arc::new(config),
        })
    }

    /// The process mode.
    pub fn mode(&self) -> InstanceMode {
        self.config.mode
    }

    /// The pool cache.
    pub fn cache(&self) -> &Arc<PoolCache<F>> {
        &self.cache
    }

    /// The tenant record store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The process configuration.
    pub fn config(&self) -> &InstanceConfig {
        &self.config
    }

    /// Resolve the context for one request.
    ///
    /// An unknown tenant fails with `TenantNotFound` and leaves no entry under
    /// its id. On a cold control plane the lookup still creates the reserved
    /// `"system"` pool it reads the registry through.
    pub async fn resolve(
        &self,
        tenant_id: Option<&TenantId>,
    ) -> TenantResult<ResolvedContext<F::Pool>> {
        let mode = self.mode();
        match mode {
            InstanceMode::DataPlane => {
                if let Some(id) = tenant_id {
                    debug!(tenant_id = %id, "Ignoring tenant identifier on a data plane");
                }
                let entry = self.current_pool().await?;
                let secret = entry.signing_secret().map(str::to_string);
                Ok(ResolvedContext::resolved(mode, entry, secret, None))
            }
            InstanceMode::ControlPlane => match tenant_id {
                None => Ok(ResolvedContext::empty(mode)),
                Some(id) if id.as_str() == SYSTEM_KEY => {
                    let entry = self.system_pool().await?;
                    Ok(ResolvedContext::resolved(
                        mode,
                        entry,
                        self.config.signing_secret.clone(),
                        Some(id.clone()),
                    ))
                }
                Some(id) => self.resolve_tenant(id).await,
            },
        }
    }

    /// The control plane's registry pool.
    pub async fn system_pool(&self) -> TenantResult<Arc<PoolEntry<F::Pool>>> {
        self.cache.gate().assert_system_access_allowed()?;
        let options = self.config.system_pool_options();
        self.cache
            .get_or_create(SYSTEM_KEY, || async move { Ok(PoolSpec::new(options)) })
            .await
    }

    /// The data plane's self pool, configured from the process environment.
    pub async fn current_pool(&self) -> TenantResult<Arc<PoolEntry<F::Pool>>> {
        let mut spec = PoolSpec::new(self.config.current_pool_options());
        if let Some(secret) = &self.config.signing_secret {
            spec = spec.with_signing_secret(secret.clone());
        }
        self.cache
            .get_or_create(CURRENT_KEY, || async move { Ok(spec) })
            .await
    }

    /// Create the pool this process always needs, ahead of the first request.
    pub async fn warm_up(&self) -> TenantResult<()> {
        match self.mode() {
            InstanceMode::ControlPlane => self.system_pool().await.map(|_| ()),
            InstanceMode::DataPlane => self.current_pool().await.map(|_| ()),
        }
    }

    async fn resolve_tenant(&self, id: &TenantId) -> TenantResult<ResolvedContext<F::Pool>> {
        // "current" is a pool key, never a tenant id
        if id.as_str().is_empty() || id.as_str() == CURRENT_KEY {
            return Err(TenantError::not_found(id));
        }

        let entry = self
            .cache
            .get_or_create(id.as_str(), || self.lookup(id))
            .await?;

        debug!(tenant_id = %id, "Resolved tenant pool");
        let secret = entry.signing_secret().map(str::to_string);
        Ok(ResolvedContext::resolved(
            self.mode(),
            entry,
            secret,
            Some(id.clone()),
        ))
    }

    async fn lookup(&self, id: &TenantId) -> TenantResult<PoolSpec> {
        let registry = self.system_pool().await?;
        let timeout = self.config.resolve_timeout;

        let record = tokio::time::timeout(timeout, self.store.find_tenant(registry.pool(), id))
            .await
            .map_err(|_| TenantError::timeout("registry lookup", timeout))??
            .ok_or_else(|| TenantError::not_found(id))?;

        let connection_string = if record.uses_system_database() {
            self.config.database_url.clone()
        } else {
            record.connection_string
        };

        debug!(
            tenant_id = %id,
            slug = %record.slug,
            system_database = connection_string == self.config.database_url,
            "Loaded tenant record"
        );

        Ok(PoolSpec::new(PoolOptions::tenant(connection_string))
            .with_signing_secret(record.signing_secret))
    }
}

impl<F: PoolFactory, S> std::fmt::Debug for TenantResolver<F, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantResolver")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish()
    }
}
