//! Error types for PostgreSQL operations.

use tessera_core::TenantError;
use thiserror::Error;

/// Result type for PostgreSQL operations.
pub type PgResult<T> = Result<T, PgError>;

/// Errors that can occur during PostgreSQL operations.
#[derive(Error, Debug)]
pub enum PgError {
    /// Connection pool error.
    #[error("pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// PostgreSQL error.
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Row deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),
}

impl PgError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a deserialization error.
    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::Deserialization(message.into())
    }

    /// Check if checking out a connection timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Pool(deadpool_postgres::PoolError::Timeout(_)))
    }
}

impl From<PgError> for TenantError {
    fn from(err: PgError) -> Self {
        match err {
            PgError::Config(msg) => TenantError::config(msg),
            other => TenantError::upstream(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::ErrorCode;

    #[test]
    fn test_error_creation() {
        let err = PgError::config("invalid URL");
        assert!(matches!(err, PgError::Config(_)));
        assert!(!err.is_timeout());

        let err = PgError::Pool(deadpool_postgres::PoolError::Timeout(
            deadpool_postgres::TimeoutType::Create,
        ));
        assert!(err.is_timeout());
    }

    #[test]
    fn test_into_tenant_error() {
        let err: TenantError = PgError::config("bad sslmode").into();
        assert_eq!(err.code(), ErrorCode::InvalidConfiguration);

        let err: TenantError = PgError::deserialization("column 'id' missing").into();
        assert_eq!(err.code(), ErrorCode::UpstreamQueryFailed);
        assert!(err.to_string().contains("column 'id' missing"));
    }
}
