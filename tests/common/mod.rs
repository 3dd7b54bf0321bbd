//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tessera::prelude::*;
use tessera::tenant::MemoryStore;

/// A pool that remembers where it points and whether it was closed.
pub struct FakePool {
    connection_string: String,
    closed: AtomicBool,
}

impl FakePool {
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl TenantPool for FakePool {
    fn connection_string(&self) -> &str {
        &self.connection_string
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Counts pool creations; connection strings containing "unreachable" fail.
#[derive(Clone, Default)]
pub struct CountingFactory {
    created: Arc<AtomicUsize>,
    delay: Option<Duration>,
}

impl CountingFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PoolFactory for CountingFactory {
    type Pool = FakePool;
    type Error = String;

    async fn create(&self, options: &PoolOptions) -> Result<FakePool, String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if options.connection_string.contains("unreachable") {
            return Err(format!("could not connect to {}", options.connection_string));
        }
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(FakePool {
            connection_string: options.connection_string.clone(),
            closed: AtomicBool::new(false),
        })
    }
}

/// A registry with one healthy tenant, one unreachable tenant and one tenant
/// stored in the registry database itself.
pub fn registry() -> MemoryStore {
    [
        TenantRecord::new("t1", "db://a", "s1").with_slug("acme"),
        TenantRecord::new("t2", "db://b", "s2"),
        TenantRecord::new("down", "db://unreachable", "s3"),
        TenantRecord::new("internal", tessera::tenant::SYSTEM_INTERNAL, "s4"),
    ]
    .into_iter()
    .collect()
}

pub fn control_plane() -> InstanceConfig {
    InstanceConfig::new(InstanceMode::ControlPlane, "db://registry")
}

pub fn data_plane() -> InstanceConfig {
    InstanceConfig::new(InstanceMode::DataPlane, "db://self")
        .with_pool_size(32)
        .with_signing_secret("own-secret")
}

pub fn studio(
    factory: CountingFactory,
    config: InstanceConfig,
) -> Studio<CountingFactory, MemoryStore> {
    Studio::new(factory, registry(), config).unwrap()
}
