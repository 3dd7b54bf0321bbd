//! Error types for tenant resolution with stable error codes.
//!
//! Every failure the resolution pipeline can produce is a distinct variant so
//! the request boundary can map it to its own response.
//!
//! # Error Codes
//!
//! Error codes follow a pattern: T{category}{number}
//! - 1xxx: Security errors (registry access from a data plane)
//! - 2xxx: Lookup errors (unknown tenant)
//! - 3xxx: Upstream errors (pool creation, registry query, timeouts)
//! - 4xxx: Configuration errors
//!
//! ```rust
//! use tessera_core::{ErrorCode, TenantError};
//!
//! let err = TenantError::not_found("t1");
//! assert_eq!(err.code(), ErrorCode::TenantNotFound);
//! assert_eq!(err.code().as_str(), "T2001");
//! ```

use std::fmt;
use thiserror::Error;

use crate::tenant::TenantId;

/// Result type for tenant operations.
pub type TenantResult<T> = Result<T, TenantError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Security errors (1xxx)
    /// A data-plane process tried to reach the system registry (T1001).
    SecurityViolation = 1001,

    // Lookup errors (2xxx)
    /// No tenant record for the identifier (T2001).
    TenantNotFound = 2001,

    // Upstream errors (3xxx)
    /// Pool construction or first connection failed (T3001).
    PoolCreationFailed = 3001,
    /// Registry query failed (T3002).
    UpstreamQueryFailed = 3002,
    /// Lookup or creation exceeded its time bound (T3003).
    Timeout = 3003,

    // Configuration errors (4xxx)
    /// Invalid process configuration (T4001).
    InvalidConfiguration = 4001,
}

impl ErrorCode {
    /// Get the string code (e.g., "T1001").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SecurityViolation => "T1001",
            Self::TenantNotFound => "T2001",
            Self::PoolCreationFailed => "T3001",
            Self::UpstreamQueryFailed => "T3002",
            Self::Timeout => "T3003",
            Self::InvalidConfiguration => "T4001",
        }
    }

    /// Get a short description of the error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::SecurityViolation => "System registry access denied",
            Self::TenantNotFound => "Tenant not found",
            Self::PoolCreationFailed => "Connection pool creation failed",
            Self::UpstreamQueryFailed => "Registry query failed",
            Self::Timeout => "Operation timed out",
            Self::InvalidConfiguration => "Invalid configuration",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while resolving a request's tenant context.
#[derive(Error, Debug, Clone)]
pub enum TenantError {
    /// The system registry was requested from a data-plane process.
    #[error("security violation: {0}")]
    SecurityViolation(String),

    /// No tenant record exists for the identifier.
    #[error("tenant '{0}' not found")]
    TenantNotFound(TenantId),

    /// The pool for `key` could not be created.
    #[error("failed to create pool '{key}': {message}")]
    PoolCreation {
        /// Cache key the pool was being created for.
        key: String,
        /// Underlying driver message.
        message: String,
    },

    /// The tenant record store could not be queried.
    #[error("registry query failed: {0}")]
    UpstreamQuery(String),

    /// An operation did not finish within its bound.
    #[error("{operation} timed out after {duration_ms}ms")]
    Timeout {
        /// What was being waited on.
        operation: &'static str,
        /// The bound that was exceeded.
        duration_ms: u64,
    },

    /// Invalid process configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl TenantError {
    /// Create a security violation error.
    pub fn security_violation(message: impl Into<String>) -> Self {
        Self::SecurityViolation(message.into())
    }

    /// Create a tenant-not-found error.
    pub fn not_found(tenant_id: impl Into<TenantId>) -> Self {
        Self::TenantNotFound(tenant_id.into())
    }

    /// Create a pool creation error.
    pub fn pool_creation(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PoolCreation {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create an upstream query error.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::UpstreamQuery(message.into())
    }

    /// Create a timeout error.
    pub fn timeout(operation: &'static str, duration: std::time::Duration) -> Self {
        Self::Timeout {
            operation,
            duration_ms: duration.as_millis() as u64,
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::SecurityViolation(_) => ErrorCode::SecurityViolation,
            Self::TenantNotFound(_) => ErrorCode::TenantNotFound,
            Self::PoolCreation { .. } => ErrorCode::PoolCreationFailed,
            Self::UpstreamQuery(_) => ErrorCode::UpstreamQueryFailed,
            Self::Timeout { .. } => ErrorCode::Timeout,
            Self::Config(_) => ErrorCode::InvalidConfiguration,
        }
    }

    /// Check if this is a security violation.
    pub fn is_security_violation(&self) -> bool {
        matches!(self, Self::SecurityViolation(_))
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::TenantNotFound(_))
    }

    /// Check if this is a pool creation error.
    pub fn is_pool_creation(&self) -> bool {
        matches!(self, Self::PoolCreation { .. })
    }

    /// Check if this is an upstream query error.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::UpstreamQuery(_))
    }

    /// Check if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether the error should raise an alert rather than just fail the request.
    pub fn is_alertable(&self) -> bool {
        self.is_security_violation()
    }
}
