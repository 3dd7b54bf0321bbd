//! Tenant registry backed by the control plane's PostgreSQL database.

use std::time::Duration;

use async_trait::async_trait;
use tessera_core::{TenantError, TenantResult};
use tessera_core::tenant::{TenantId, TenantRecord, TenantStore};
use tokio_postgres::Row;
use tracing::debug;

use crate::error::{PgError, PgResult};
use crate::pool::PgPool;

/// Registry table read when none is configured.
pub const DEFAULT_REGISTRY_TABLE: &str = "projects";

/// Looks tenant records up in the registry table through the system pool.
///
/// The table must have the columns `id`, `slug`, `connection_string`,
/// `signing_secret` and `cors_origins` (`text[]`, nullable).
#[derive(Debug, Clone)]
pub struct PgTenantStore {
    table: String,
    sql: String,
}

impl PgTenantStore {
    /// A store reading [`DEFAULT_REGISTRY_TABLE`].
    pub fn new() -> Self {
        Self::for_table(DEFAULT_REGISTRY_TABLE)
    }

    /// A store reading `table`, optionally schema-qualified.
    pub fn with_table(table: impl Into<String>) -> PgResult<Self> {
        let table = table.into();
        let valid = !table.is_empty()
            && table.split('.').all(|part| {
                !part.is_empty()
                    && !part.starts_with(|c: char| c.is_ascii_digit())
                    && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            });
        if !valid {
            return Err(PgError::config(format!(
                "invalid registry table name '{}'",
                table
            )));
        }
        Ok(Self::for_table(&table))
    }

    fn for_table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            sql: format!(
                "SELECT id::text AS id, slug, connection_string, signing_secret, cors_origins \
                 FROM {} WHERE id::text = $1",
                table
            ),
        }
    }

    /// The registry table.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The lookup query.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    async fn fetch(
        &self,
        registry: &PgPool,
        tenant_id: &TenantId,
    ) -> PgResult<Option<TenantRecord>> {
        let conn = registry.get().await?;
        let row = conn.query_opt(&self.sql, &[&tenant_id.as_str()]).await?;
        row.as_ref().map(record_from_row).transpose()
    }
}

impl Default for PgTenantStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TenantStore<PgPool> for PgTenantStore {
    async fn find_tenant(
        &self,
        registry: &PgPool,
        tenant_id: &TenantId,
    ) -> TenantResult<Option<TenantRecord>> {
        debug!(tenant_id = %tenant_id, table = %self.table, "Querying tenant registry");
        self.fetch(registry, tenant_id)
            .await
            .map_err(|err| registry_error(err, registry.config().connect_timeout))
    }
}

/// A checkout that waited out the pool's bound is a timeout, not a failed query.
fn registry_error(err: PgError, wait_timeout: Duration) -> TenantError {
    if err.is_timeout() {
        TenantError::timeout("registry connection checkout", wait_timeout)
    } else {
        err.into()
    }
}

fn record_from_row(row: &Row) -> PgResult<TenantRecord> {
    let column = |name: &str| -> PgResult<String> {
        row.try_get::<_, String>(name)
            .map_err(|e| PgError::deserialization(format!("column '{}': {}", name, e)))
    };

    let cors_origins: Option<Vec<String>> = row
        .try_get("cors_origins")
        .map_err(|e| PgError::deserialization(format!("column 'cors_origins': {}", e)))?;

    Ok(TenantRecord::new(
        column("id")?,
        column("connection_string")?,
        column("signing_secret")?,
    )
    .with_slug(column("slug")?)
    .with_cors_origins(cors_origins.unwrap_or_default()))
}
