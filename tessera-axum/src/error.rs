//! Rejections returned when a request's tenant context cannot be attached.

use axum::response::{IntoResponse, Response};
use http::StatusCode;
use tessera_core::TenantError;
use thiserror::Error;
use tracing::warn;

/// Why a request was rejected before reaching its handler.
#[derive(Error, Debug, Clone)]
pub enum TenantRejection {
    /// Tenant resolution failed.
    #[error(transparent)]
    Resolve(#[from] TenantError),

    /// The tenant header is not valid UTF-8.
    #[error("invalid tenant header '{0}'")]
    InvalidHeader(String),

    /// The handler needs a tenant pool but the request named no tenant.
    #[error("tenant identifier required")]
    MissingTenant,

    /// No resolved context on the request; the tenant layer is not installed.
    #[error("tenant context not attached")]
    MissingContext,
}

impl TenantRejection {
    /// The HTTP status for this rejection.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Resolve(err) => status_for(err),
            Self::InvalidHeader(_) | Self::MissingTenant => StatusCode::BAD_REQUEST,
            Self::MissingContext => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// HTTP status for a resolution failure.
pub fn status_for(err: &TenantError) -> StatusCode {
    match err {
        TenantError::SecurityViolation(_) => StatusCode::FORBIDDEN,
        TenantError::TenantNotFound(_) => StatusCode::NOT_FOUND,
        TenantError::PoolCreation { .. } => StatusCode::SERVICE_UNAVAILABLE,
        TenantError::UpstreamQuery(_) => StatusCode::BAD_GATEWAY,
        TenantError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        TenantError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for TenantRejection {
    fn into_response(self) -> Response {
        let status = self.status();
        // Server-side failures can carry hosts or driver detail; clients only
        // see the error category.
        let body = match &self {
            Self::Resolve(err) if status.is_server_error() => {
                warn!(code = %err.code(), error = %err, "Tenant resolution failed");
                format!("{}: {}", err.code(), err.code().description())
            }
            Self::Resolve(err) => format!("{}: {}", err.code(), err),
            other => other.to_string(),
        };
        (status, body).into_response()
    }
}
