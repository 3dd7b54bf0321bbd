//! PostgreSQL connection wrapper.

use deadpool_postgres::Object;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;
use tracing::debug;

use crate::error::PgResult;

/// A pooled connection. Statements are prepared once per connection and
/// reused through the pool's statement cache.
pub struct PgConnection {
    client: Object,
}

impl PgConnection {
    pub(crate) fn new(client: Object) -> Self {
        Self { client }
    }

    /// Execute a query and return zero or one row.
    pub async fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> PgResult<Option<Row>> {
        debug!(sql = %sql, "Executing query_opt");
        let stmt = self.client.prepare_cached(sql).await?;
        Ok(self.client.query_opt(&stmt, params).await?)
    }
}
