//! Shared mock pools and factories for broker integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use shard_broker::config::BackendParameters;
use shard_broker::pool::{BackendConnection, ClosablePool, ConnectionPool, PoolError};
use shard_broker::{BackendConnectionBroker, DisabledBackends, FactoryRegistry, PoolFactory, TransactionMode};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Counters a mock pool and its connections report into.
#[derive(Debug, Default)]
pub struct PoolStats {
    /// Borrow calls that reached the pool, successful or not.
    pub borrow_calls: AtomicUsize,
    /// Connections actually handed out.
    pub issued: AtomicUsize,
    /// Connections handed back (dropped by the caller).
    pub returned: AtomicUsize,
    /// Borrow calls currently inside the pool.
    pub in_flight: AtomicUsize,
    /// High-water mark of concurrent borrow calls.
    pub max_in_flight: AtomicUsize,
    /// Close invocations.
    pub closes: AtomicUsize,
}

impl PoolStats {
    pub fn leaked(&self) -> bool {
        self.issued.load(Ordering::SeqCst) != self.returned.load(Ordering::SeqCst)
    }
}

pub struct MockConnection {
    stats: Arc<PoolStats>,
}

impl BackendConnection for MockConnection {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Drop for MockConnection {
    fn drop(&mut self) {
        self.stats.returned.fetch_add(1, Ordering::SeqCst);
    }
}

/// Configurable mock pool: optional per-borrow delay, failure injection after
/// N issued connections, optional close capability and close failure.
pub struct MockPool {
    pub stats: Arc<PoolStats>,
    borrow_delay: Option<Duration>,
    fail_after: Option<usize>,
    closable: bool,
    fail_close: bool,
}

impl MockPool {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(PoolStats::default()),
            borrow_delay: None,
            fail_after: None,
            closable: true,
            fail_close: false,
        }
    }

    pub fn with_borrow_delay(mut self, delay: Duration) -> Self {
        self.borrow_delay = Some(delay);
        self
    }

    pub fn failing_after(mut self, issued: usize) -> Self {
        self.fail_after = Some(issued);
        self
    }

    pub fn without_close_capability(mut self) -> Self {
        self.closable = false;
        self
    }

    pub fn with_failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }
}

#[async_trait]
impl ConnectionPool for MockPool {
    async fn borrow(&self) -> Result<Box<dyn BackendConnection>, PoolError> {
        self.stats.borrow_calls.fetch_add(1, Ordering::SeqCst);
        let current = self.stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if let Some(delay) = self.borrow_delay {
            tokio::time::sleep(delay).await;
        }
        self.stats.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(limit) = self.fail_after {
            if self.stats.issued.load(Ordering::SeqCst) >= limit {
                return Err(format!("backend exhausted after {limit} connections").into());
            }
        }
        self.stats.issued.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockConnection {
            stats: Arc::clone(&self.stats),
        }))
    }

    fn as_closable(&self) -> Option<&dyn ClosablePool> {
        if self.closable { Some(self) } else { None }
    }
}

#[async_trait]
impl ClosablePool for MockPool {
    async fn close(&self) -> Result<(), PoolError> {
        self.stats.closes.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err("close failed".into());
        }
        Ok(())
    }
}

/// Pool whose borrows block until the test releases them, one permit each.
pub struct GatedPool {
    pub stats: Arc<PoolStats>,
    gate: Arc<tokio::sync::Semaphore>,
}

impl GatedPool {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(PoolStats::default()),
            gate: Arc::new(tokio::sync::Semaphore::new(0)),
        }
    }

    /// Let `n` pending (or future) borrows through.
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }
}

#[async_trait]
impl ConnectionPool for GatedPool {
    async fn borrow(&self) -> Result<Box<dyn BackendConnection>, PoolError> {
        self.stats.borrow_calls.fetch_add(1, Ordering::SeqCst);
        self.gate
            .acquire()
            .await
            .map_err(|_| "gate closed".to_string())?
            .forget();
        self.stats.issued.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockConnection {
            stats: Arc::clone(&self.stats),
        }))
    }
}

/// Pool whose borrows rendezvous at a barrier, so a test can prove two
/// callers' borrows were in the pool at the same time.
pub struct BarrierPool {
    pub stats: Arc<PoolStats>,
    barrier: Arc<tokio::sync::Barrier>,
}

impl BarrierPool {
    pub fn new(parties: usize) -> Self {
        Self::sharing(Arc::new(tokio::sync::Barrier::new(parties)))
    }

    /// Share one barrier across several pools to prove cross-pool overlap.
    pub fn sharing(barrier: Arc<tokio::sync::Barrier>) -> Self {
        Self {
            stats: Arc::new(PoolStats::default()),
            barrier,
        }
    }
}

#[async_trait]
impl ConnectionPool for BarrierPool {
    async fn borrow(&self) -> Result<Box<dyn BackendConnection>, PoolError> {
        self.stats.borrow_calls.fetch_add(1, Ordering::SeqCst);
        self.barrier.wait().await;
        self.stats.issued.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockConnection {
            stats: Arc::clone(&self.stats),
        }))
    }
}

/// Factory serving pre-built pools by backend name, with optional per-name
/// construction failure.
#[derive(Default)]
pub struct MockFactory {
    pools: HashMap<String, Arc<dyn ConnectionPool>>,
    fail_for: Option<String>,
}

impl MockFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pool(mut self, name: &str, pool: Arc<dyn ConnectionPool>) -> Self {
        self.pools.insert(name.to_string(), pool);
        self
    }

    pub fn failing_for(mut self, name: &str) -> Self {
        self.fail_for = Some(name.to_string());
        self
    }
}

#[async_trait]
impl PoolFactory for MockFactory {
    async fn build(
        &self,
        name: &str,
        _params: &BackendParameters,
    ) -> Result<Arc<dyn ConnectionPool>, PoolError> {
        if self.fail_for.as_deref() == Some(name) {
            return Err(format!("backend `{name}` unreachable").into());
        }
        match self.pools.get(name) {
            Some(pool) => Ok(Arc::clone(pool)),
            None => Ok(Arc::new(MockPool::new())),
        }
    }
}

/// Backend parameter stubs for the given names (mocks never dial them).
pub fn backend_params(names: &[&str]) -> Vec<(String, BackendParameters)> {
    names
        .iter()
        .map(|name| {
            (
                name.to_string(),
                BackendParameters::new(format!("mysql://localhost:3306/{name}")),
            )
        })
        .collect()
}

/// Broker over a mock factory, the usual test fixture.
pub async fn mock_broker(
    factory: MockFactory,
    names: &[&str],
    disabled: DisabledBackends,
) -> BackendConnectionBroker {
    let factories = FactoryRegistry::new(Arc::new(factory));
    BackendConnectionBroker::with_factories(
        "sharding_db",
        backend_params(names),
        TransactionMode::Local,
        disabled,
        &factories,
    )
    .await
    .expect("mock broker construction cannot fail")
}
