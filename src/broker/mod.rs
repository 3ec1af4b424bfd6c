//! The per-schema connection broker.
//!
//! This module wires the pieces together:
//! - Factory selection keyed by transaction mode
//! - The insertion-ordered backend pool registry with its disabled-view filter
//! - The two acquisition strictness disciplines
//! - The best-effort shutdown pass over heterogeneous pools

pub mod acquire;
pub mod factory;
pub mod lifecycle;
pub mod registry;

pub use acquire::ConnectionStrictness;
pub use factory::{FactoryRegistry, PoolFactory, TransactionMode};
pub use registry::BackendPoolRegistry;

use crate::config::BackendParameters;
use crate::error::{BrokerError, BrokerResult};
use crate::pool::BackendConnection;
use crate::topology::DisabledBackends;
use acquire::ConnectionAcquirer;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// Per-schema broker handing out raw physical connections to backend shards.
///
/// One instance owns one pool per configured backend for its whole lifetime.
/// Multiple tasks may call [`get_connections`](Self::get_connections) and
/// [`close`](Self::close) concurrently.
pub struct BackendConnectionBroker {
    schema: String,
    registry: BackendPoolRegistry,
    acquirer: ConnectionAcquirer,
    disabled: DisabledBackends,
    closed: AtomicBool,
}

impl BackendConnectionBroker {
    /// Build a broker with the stock factory wiring for `mode`.
    ///
    /// Construction is all-or-nothing: any backend whose pool cannot be built
    /// aborts the broker with [`BrokerError::PoolConstruction`].
    pub async fn new(
        schema: &str,
        backends: Vec<(String, BackendParameters)>,
        mode: TransactionMode,
        disabled: DisabledBackends,
    ) -> BrokerResult<Self> {
        Self::with_factories(schema, backends, mode, disabled, &FactoryRegistry::with_defaults())
            .await
    }

    /// Build a broker selecting the factory for `mode` from a caller-supplied
    /// registry. This is the seam for new transaction modes and for tests.
    pub async fn with_factories(
        schema: &str,
        backends: Vec<(String, BackendParameters)>,
        mode: TransactionMode,
        disabled: DisabledBackends,
        factories: &FactoryRegistry,
    ) -> BrokerResult<Self> {
        let factory = factories.select(mode);
        let registry = BackendPoolRegistry::build(schema, &backends, factory.as_ref()).await?;
        let acquirer = ConnectionAcquirer::new(registry.names());
        info!(
            schema,
            mode = %mode,
            backends = registry.len(),
            "backend connection broker ready"
        );
        Ok(Self {
            schema: schema.to_string(),
            registry,
            acquirer,
            disabled,
            closed: AtomicBool::new(false),
        })
    }

    /// Get one connection from the named backend.
    ///
    /// Sugar for `get_connections(MemoryStrictly, backend, 1)`; as a
    /// single-connection call it takes the hot path with no batch lock.
    pub async fn get_connection(&self, backend: &str) -> BrokerResult<Box<dyn BackendConnection>> {
        let mut connections = self
            .get_connections(ConnectionStrictness::MemoryStrictly, backend, 1)
            .await?;
        match connections.pop() {
            Some(conn) => Ok(conn),
            None => Err(BrokerError::acquisition(
                backend,
                1,
                "pool returned no connection".into(),
            )),
        }
    }

    /// Get exactly `count` connections from the named backend under the
    /// requested strictness.
    ///
    /// The backend is resolved through the effective registry view, so a
    /// freshly disabled backend stops resolving without a rebuild; an unknown
    /// or disabled name fails before any pool is contacted. Callers own the
    /// returned connections and hand them back by dropping them.
    pub async fn get_connections(
        &self,
        strictness: ConnectionStrictness,
        backend: &str,
        count: usize,
    ) -> BrokerResult<Vec<Box<dyn BackendConnection>>> {
        let pool = self.registry.lookup(backend, &self.disabled.snapshot())?;
        self.acquirer
            .acquire(pool.as_ref(), backend, strictness, count)
            .await
    }

    /// Tear the broker down, closing every owned pool at most once.
    ///
    /// Idempotent: only the first call runs the shutdown pass. Shutdown
    /// errors are logged and suppressed.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        info!(schema = %self.schema, "closing backend pools");
        lifecycle::close_all(&self.registry).await;
    }

    /// Whether [`close`](Self::close) has run.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Configured backend names in insertion order, disabled ones included.
    pub fn backend_names(&self) -> Vec<&str> {
        self.registry.names().collect()
    }

    /// The logical schema this broker serves.
    pub fn schema(&self) -> &str {
        &self.schema
    }
}
