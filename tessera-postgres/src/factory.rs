//! Pool factory handed to the tenant pool cache.

use async_trait::async_trait;
use tessera_core::tenant::{PoolFactory, PoolOptions};

use crate::error::PgError;
use crate::pool::PgPool;

/// Builds a [`PgPool`] for each cache miss.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgPoolFactory;

impl PgPoolFactory {
    /// Create a factory.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PoolFactory for PgPoolFactory {
    type Pool = PgPool;
    type Error = PgError;

    async fn create(&self, options: &PoolOptions) -> Result<PgPool, PgError> {
        PgPool::connect(options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url_fails_before_connecting() {
        let err = PgPoolFactory::new()
            .create(&PoolOptions::tenant("db://a"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, PgError::Config(_)));
    }
}
