//! Process bootstrap wiring configuration, gate, cache, store and resolver.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tessera_axum::TenantLayer;
use tessera_core::tenant::{
    CacheStats, ModeGate, PoolCache, PoolFactory, TenantResolver, TenantStore,
};
use tessera_core::{InstanceConfig, TenantResult};
use tokio::task::JoinHandle;
use tracing::info;

/// One control-plane or data-plane process.
///
/// Holds the only [`PoolCache`] of the process. Create one at start-up and
/// hand [`Studio::layer`] to the router.
pub struct Studio<F: PoolFactory, S> {
    resolver: Arc<TenantResolver<F, S>>,
}

#[cfg(feature = "postgres")]
impl Studio<tessera_postgres::PgPoolFactory, tessera_postgres::PgTenantStore> {
    /// Build a PostgreSQL-backed studio from the process environment.
    pub fn from_env() -> TenantResult<Self> {
        Self::from_config(InstanceConfig::from_env()?)
    }

    /// Build a PostgreSQL-backed studio from a configuration.
    pub fn from_config(config: InstanceConfig) -> TenantResult<Self> {
        Self::new(
            tessera_postgres::PgPoolFactory::new(),
            tessera_postgres::PgTenantStore::new(),
            config,
        )
    }
}

impl<F, S> Studio<F, S>
where
    F: PoolFactory,
    S: TenantStore<F::Pool> + 'static,
{
    /// Wire a studio from its parts.
    ///
    /// Pool creation is bounded by the configured resolve timeout.
    pub fn new(factory: F, store: S, config: InstanceConfig) -> TenantResult<Self> {
        let cache = PoolCache::new(factory, ModeGate::new(config.mode))
            .with_create_timeout(config.resolve_timeout);
        let resolver = TenantResolver::new(Arc::new(cache), Arc::new(store), config)?;

        info!(mode = %resolver.mode(), "Studio initialized");
        Ok(Self {
            resolver: Arc::new(resolver),
        })
    }

    /// The resolver.
    pub fn resolver(&self) -> &Arc<TenantResolver<F, S>> {
        &self.resolver
    }

    /// The pool cache.
    pub fn cache(&self) -> &Arc<PoolCache<F>> {
        self.resolver.cache()
    }

    /// The middleware layer attaching tenant contexts to requests.
    pub fn layer(&self) -> TenantResult<TenantLayer<F, S>> {
        TenantLayer::new(self.resolver.clone())
    }

    /// Create the registry pool (control plane) or the self pool (data plane)
    /// before the first request.
    pub async fn warm_up(&self) -> TenantResult<()> {
        self.resolver.warm_up().await
    }

    /// Cache counters.
    pub fn stats(&self) -> CacheStats {
        self.cache().stats()
    }

    /// Evict tenant pools idle for `idle`, checking every `every`.
    ///
    /// The task ends once the cache is dropped; abort the handle to stop it
    /// sooner.
    pub fn spawn_idle_eviction(&self, every: Duration, idle: Duration) -> JoinHandle<()> {
        let cache: Weak<PoolCache<F>> = Arc::downgrade(self.cache());
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(cache) = cache.upgrade() else {
                    break;
                };
                let evicted = cache.evict_idle(idle);
                if evicted > 0 {
                    info!(evicted, remaining = cache.len(), "Evicted idle tenant pools");
                }
            }
        })
    }

    /// Close every pool. Call once the server has stopped taking requests.
    pub fn shutdown(&self) -> usize {
        self.cache().close_all()
    }
}

impl<F: PoolFactory, S> std::fmt::Debug for Studio<F, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("resolver", &self.resolver)
            .finish()
    }
}
