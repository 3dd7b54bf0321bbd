//! Tenant records and the store they are looked up in.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::context::TenantId;
use crate::error::TenantResult;

/// Connection string telling the resolver to use the control plane's own database.
pub const SYSTEM_INTERNAL: &str = "SYSTEM_INTERNAL";

/// Registry metadata of one tenant deployment.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantRecord {
    /// Opaque unique identifier.
    pub id: TenantId,
    /// Human-readable identifier for display and URLs.
    pub slug: String,
    /// Address and credentials of the tenant database.
    pub connection_string: String,
    /// Secret for this tenant's tokens.
    pub signing_secret: String,
    /// Allowed CORS origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl TenantRecord {
    /// Create a record.
    pub fn new(
        id: impl Into<TenantId>,
        connection_string: impl Into<String>,
        signing_secret: impl Into<String>,
    ) -> Self {
        let id = id.into();
        Self {
            slug: id.as_str().to_string(),
            id,
            connection_string: connection_string.into(),
            signing_secret: signing_secret.into(),
            cors_origins: Vec::new(),
        }
    }

    /// Set the slug.
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }

    /// Add allowed CORS origins.
    pub fn with_cors_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cors_origins.extend(origins.into_iter().map(Into::into));
        self
    }

    /// Whether the tenant lives in the control plane's own database.
    pub fn uses_system_database(&self) -> bool {
        self.connection_string == SYSTEM_INTERNAL
    }
}

impl fmt::Debug for TenantRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantRecord")
            .field("id", &self.id)
            .field("slug", &self.slug)
            .field(
                "connection_string",
                &super::pool::redact_connection_string(&self.connection_string),
            )
            .field("signing_secret", &"***")
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

/// Looks up tenant records through the registry pool `P`.
///
/// Absence is a normal outcome and is reported as `Ok(None)`; errors are
/// reserved for a store that cannot be queried.
#[async_trait]
pub trait TenantStore<P>: Send + Sync {
    /// Find the record for `tenant_id`.
    async fn find_tenant(&self, registry: &P, tenant_id: &TenantId)
    -> TenantResult<Option<TenantRecord>>;
}

/// An in-memory tenant store.
///
/// Ignores the registry pool it is given. Useful for local development and
/// tests; it also counts lookups so callers can assert when the registry was
/// consulted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tenants: RwLock<HashMap<TenantId, TenantRecord>>,
    lookups: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record.
    pub fn insert(&self, record: TenantRecord) -> &Self {
        self.tenants.write().insert(record.id.clone(), record);
        self
    }

    /// Remove a record.
    pub fn remove(&self, tenant_id: &str) -> Option<TenantRecord> {
        self.tenants.write().remove(&TenantId::new(tenant_id))
    }

    /// Number of lookups served so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.tenants.read().len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<TenantRecord> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = TenantRecord>>(iter: I) -> Self {
        let store = Self::new();
        for record in iter {
            store.insert(record);
        }
        store
    }
}

#[async_trait]
impl<P: Sync> TenantStore<P> for MemoryStore {
    async fn find_tenant(
        &self,
        _registry: &P,
        tenant_id: &TenantId,
    ) -> TenantResult<Option<TenantRecord>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.tenants.read().get(tenant_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builder() {
        let record = TenantRecord::new("t1", "postgres://localhost/t1", "s1")
            .with_slug("acme")
            .with_cors_origins(["https://acme.test"]);

        assert_eq!(record.slug, "acme");
        assert_eq!(record.cors_origins, vec!["https://acme.test".to_string()]);
        assert!(!record.uses_system_database());
        assert!(TenantRecord::new("t2", SYSTEM_INTERNAL, "s2").uses_system_database());
    }

    #[test]
    fn test_record_debug_hides_credentials() {
        let record = TenantRecord::new("t1", "postgres://app:pw@localhost/t1", "s1");
        let rendered = format!("{:?}", record);
        assert!(!rendered.contains(":pw@"));
        assert!(!rendered.contains("\"s1\""));
    }

    #[tokio::test]
    async fn test_memory_store_lookup() {
        let store: MemoryStore = [TenantRecord::new("t1", "db://a", "s1")]
            .into_iter()
            .collect();

        let found = store.find_tenant(&(), &TenantId::new("t1")).await.unwrap();
        assert_eq!(found.unwrap().signing_secret, "s1");

        let missing = store.find_tenant(&(), &TenantId::new("t9")).await.unwrap();
        assert!(missing.is_none());
        assert_eq!(store.lookups(), 2);
    }
}
