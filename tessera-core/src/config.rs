//! Process configuration read from the environment.
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `INSTANCE_MODE` | `CONTROL_PLANE` or `DATA_PLANE` | `CONTROL_PLANE` |
//! | `DATABASE_URL` | registry database (control plane) or the tenant's own database (data plane) | required |
//! | `POOL_SIZE` | max connections of the data plane's self pool | 20 |
//! | `JWT_SECRET` | data plane signing secret | unset |
//! | `TENANT_HEADER` | request header carrying the tenant id | `x-project-id` |
//! | `RESOLVE_TIMEOUT_MS` | bound on registry lookups and pool creation | 10000 |
//!
//! Values are read through an [`EnvSource`] so tests can supply a map
//! instead of the process environment.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tracing::info;

use crate::error::{TenantError, TenantResult};
use crate::tenant::{InstanceMode, PoolOptions, redact_connection_string};

/// Default request header carrying the tenant identifier.
pub const DEFAULT_TENANT_HEADER: &str = "x-project-id";

/// Default bound on registry lookups and pool creation.
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(10);

/// Source for environment variables.
pub trait EnvSource: Send + Sync {
    /// Get an environment variable value.
    fn get(&self, name: &str) -> Option<String>;
}

/// Default environment source using std::env.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Environment source backed by a HashMap.
#[derive(Debug, Clone, Default)]
pub struct MapEnvSource {
    vars: HashMap<String, String>,
}

impl MapEnvSource {
    /// Create a new map-based environment source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl EnvSource for MapEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Configuration of one control-plane or data-plane process.
#[derive(Clone)]
pub struct InstanceConfig {
    /// The process mode.
    pub mode: InstanceMode,
    /// The registry database, or the tenant database on a data plane.
    pub database_url: String,
    /// Override for the data plane's self pool size.
    pub pool_size: Option<usize>,
    /// Signing secret of the tenant a data plane serves.
    pub signing_secret: Option<String>,
    /// Request header carrying the tenant id.
    pub tenant_header: String,
    /// Bound on registry lookups and pool creation.
    pub resolve_timeout: Duration,
}

impl InstanceConfig {
    /// Create a configuration with defaults for everything but mode and URL.
    pub fn new(mode: InstanceMode, database_url: impl Into<String>) -> Self {
        Self {
            mode,
            database_url: database_url.into(),
            pool_size: None,
            signing_secret: None,
            tenant_header: DEFAULT_TENANT_HEADER.to_string(),
            resolve_timeout: DEFAULT_RESOLVE_TIMEOUT,
        }
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> TenantResult<Self> {
        Self::from_source(&StdEnvSource)
    }

    /// Load configuration from an environment source.
    pub fn from_source(env: &impl EnvSource) -> TenantResult<Self> {
        let mode = match non_empty(env, "INSTANCE_MODE") {
            Some(value) => value.parse()?,
            None => InstanceMode::default(),
        };

        let database_url = non_empty(env, "DATABASE_URL")
            .ok_or_else(|| TenantError::config("DATABASE_URL must be set"))?;

        let pool_size = match non_empty(env, "POOL_SIZE") {
            Some(value) => Some(parse_positive(&value, "POOL_SIZE")?),
            None => None,
        };

        let resolve_timeout = match non_empty(env, "RESOLVE_TIMEOUT_MS") {
            Some(value) => {
                Duration::from_millis(parse_positive(&value, "RESOLVE_TIMEOUT_MS")? as u64)
            }
            None => DEFAULT_RESOLVE_TIMEOUT,
        };

        let config = Self {
            mode,
            database_url,
            pool_size,
            signing_secret: non_empty(env, "JWT_SECRET"),
            tenant_header: non_empty(env, "TENANT_HEADER")
                .unwrap_or_else(|| DEFAULT_TENANT_HEADER.to_string()),
            resolve_timeout,
        };

        info!(
            mode = %config.mode,
            database = %redact_connection_string(&config.database_url),
            pool_size = ?config.pool_size,
            "Loaded instance configuration"
        );

        Ok(config)
    }

    /// Set the data plane's self pool size.
    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = Some(size);
        self
    }

    /// Set the data plane's signing secret.
    pub fn with_signing_secret(mut self, secret: impl Into<String>) -> Self {
        self.signing_secret = Some(secret.into());
        self
    }

    /// Set the tenant header name.
    pub fn with_tenant_header(mut self, header: impl Into<String>) -> Self {
        self.tenant_header = header.into();
        self
    }

    /// Set the resolve timeout.
    pub fn with_resolve_timeout(mut self, timeout: Duration) -> Self {
        self.resolve_timeout = timeout;
        self
    }

    /// Pool options of the control plane's registry pool.
    pub fn system_pool_options(&self) -> PoolOptions {
        PoolOptions::system(&self.database_url)
    }

    /// Pool options of the data plane's self pool.
    pub fn current_pool_options(&self) -> PoolOptions {
        PoolOptions::current(&self.database_url, self.pool_size)
    }
}

impl fmt::Debug for InstanceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceConfig")
            .field("mode", &self.mode)
            .field("database_url", &redact_connection_string(&self.database_url))
            .field("pool_size", &self.pool_size)
            .field("has_signing_secret", &self.signing_secret.is_some())
            .field("tenant_header", &self.tenant_header)
            .field("resolve_timeout", &self.resolve_timeout)
            .finish()
    }
}

fn non_empty(env: &impl EnvSource, name: &str) -> Option<String> {
    env.get(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_positive(value: &str, name: &str) -> TenantResult<usize> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(TenantError::config(format!(
            "{} must be a positive integer, got '{}'",
            name, value
        ))),
    }
}
