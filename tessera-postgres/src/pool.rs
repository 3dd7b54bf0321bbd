//! Connection pool for PostgreSQL.

use std::sync::{Arc, Weak};
use std::time::Duration;

use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, Runtime};
use tessera_core::tenant::{PoolOptions, TenantPool, redact_connection_string};
use tokio_postgres::NoTls;
use tracing::{debug, info};

use crate::config::PgConfig;
use crate::connection::PgConnection;
use crate::error::{PgError, PgResult};

/// A connection pool for PostgreSQL.
///
/// Clones share the same connections. The pool closes when [`PgPool::close`]
/// is called or the last clone is dropped.
#[derive(Clone)]
pub struct PgPool {
    shared: Arc<Shared>,
}

struct Shared {
    inner: Pool,
    config: PgConfig,
    connection_string: String,
    idle_timeout: Duration,
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.inner.close();
    }
}

impl PgPool {
    /// Create a pool and check out one connection to verify the database is
    /// reachable.
    pub async fn connect(options: &PoolOptions) -> PgResult<Self> {
        let config = PgConfig::from_options(options)?;

        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };
        let mgr = Manager::from_config(config.to_pg_config(), NoTls, mgr_config);

        let pool = Pool::builder(mgr)
            .max_size(options.max_connections)
            .wait_timeout(Some(options.connect_timeout))
            .create_timeout(Some(options.connect_timeout))
            .recycle_timeout(Some(options.connect_timeout))
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| PgError::config(format!("failed to create pool: {}", e)))?;

        drop(pool.get().await?);

        info!(
            host = %config.host,
            port = %config.port,
            database = %config.database,
            max_connections = %options.max_connections,
            "PostgreSQL connection pool created"
        );

        let shared = Arc::new(Shared {
            inner: pool,
            config,
            connection_string: options.connection_string.clone(),
            idle_timeout: options.idle_timeout,
        });
        spawn_idle_reaper(Arc::downgrade(&shared), options.idle_timeout);

        Ok(Self { shared })
    }

    /// Get a connection from the pool.
    pub async fn get(&self) -> PgResult<PgConnection> {
        debug!("Acquiring connection from pool");
        let client = self.shared.inner.get().await?;
        Ok(PgConnection::new(client))
    }

    /// Get the connection configuration.
    pub fn config(&self) -> &PgConfig {
        &self.shared.config
    }

    /// Idle time after which a connection is closed.
    pub fn idle_timeout(&self) -> Duration {
        self.shared.idle_timeout
    }

    /// Check if the pool has been closed.
    pub fn is_closed(&self) -> bool {
        self.shared.inner.is_closed()
    }

    /// Close the pool and all idle connections.
    pub fn close(&self) {
        self.shared.inner.close();
        info!(
            connection = %redact_connection_string(&self.shared.connection_string),
            "PostgreSQL connection pool closed"
        );
    }
}

impl TenantPool for PgPool {
    fn connection_string(&self) -> &str {
        &self.shared.connection_string
    }

    fn close(&self) {
        PgPool::close(self);
    }
}

/// Periodically drop connections idle for longer than `idle`.
///
/// The task stops once the pool is closed or dropped.
fn spawn_idle_reaper(weak: Weak<Shared>, idle: Duration) {
    if idle.is_zero() {
        return;
    }
    let period = (idle / 2).max(Duration::from_secs(1));

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let Some(shared) = weak.upgrade() else {
                break;
            };
            if shared.inner.is_closed() {
                break;
            }
            let result = shared.inner.retain(|_, metrics| metrics.last_used() < idle);
            if !result.removed.is_empty() {
                debug!(
                    removed = result.removed.len(),
                    retained = result.retained,
                    "Closed idle connections"
                );
            }
        }
    });
}
