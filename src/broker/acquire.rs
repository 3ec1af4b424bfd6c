//! Connection acquisition strategies.
//!
//! # Concurrency discipline
//!
//! - `count == 1` is the hot path: one borrow, no broker synchronization.
//! - `ConnectionStrictly` batches borrow sequentially with no mutual
//!   exclusion beyond what the pool itself provides; the caller has asserted
//!   each connection may be bound independently.
//! - `MemoryStrictly` batches hold an exclusive per-backend lock for the
//!   duration of the borrows, so concurrent batches against one
//!   capacity-limited pool cannot drive it past its intended size.
//!
//! The lock is keyed by backend name and owned here, never borrowed from a
//! pool object's identity, so the locking discipline stays visible and
//! testable. Batches against different backends never contend.

use crate::error::{BrokerError, BrokerResult};
use crate::pool::{BackendConnection, ConnectionPool};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// Discipline governing how a batch of connections is taken from one pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStrictness {
    /// Serialize batch acquisition per backend, economizing pool memory over
    /// raw throughput.
    MemoryStrictly,
    /// No admission control from the broker; each borrow is independent.
    ConnectionStrictly,
}

/// Applies the acquisition disciplines over the pools the registry resolves.
pub(crate) struct ConnectionAcquirer {
    batch_locks: HashMap<String, Mutex<()>>,
}

impl ConnectionAcquirer {
    /// One batch lock per configured backend, fixed at construction.
    pub(crate) fn new<'a>(backends: impl Iterator<Item = &'a str>) -> Self {
        Self {
            batch_locks: backends
                .map(|name| (name.to_string(), Mutex::new(())))
                .collect(),
        }
    }

    /// Acquire exactly `count` connections from `pool` under the requested
    /// strictness. On any failure the caller gets an error and the pool gets
    /// every already-borrowed connection back.
    pub(crate) async fn acquire(
        &self,
        pool: &dyn ConnectionPool,
        backend: &str,
        strictness: ConnectionStrictness,
        count: usize,
    ) -> BrokerResult<Vec<Box<dyn BackendConnection>>> {
        if count == 0 {
            return Err(BrokerError::invalid_request(
                "connection count must be positive",
            ));
        }
        // Hot path: a single borrow never takes the batch lock.
        if count == 1 {
            let conn = pool
                .borrow()
                .await
                .map_err(|source| BrokerError::acquisition(backend, 1, source))?;
            return Ok(vec![conn]);
        }
        match strictness {
            ConnectionStrictness::ConnectionStrictly => {
                self.borrow_batch(pool, backend, count).await
            }
            ConnectionStrictness::MemoryStrictly => match self.batch_locks.get(backend) {
                Some(lock) => {
                    let _guard = lock.lock().await;
                    self.borrow_batch(pool, backend, count).await
                    // guard drops here, releasing the backend's batch lock
                }
                // Locks cover every configured backend; an unlisted name can
                // only reach here through a foreign pool handle.
                None => {
                    debug!(backend, "no batch lock for backend, borrowing unserialized");
                    self.borrow_batch(pool, backend, count).await
                }
            },
        }
    }

    /// Sequential borrows. On failure, dropping the partial batch hands every
    /// connection already taken in this call back to the pool.
    async fn borrow_batch(
        &self,
        pool: &dyn ConnectionPool,
        backend: &str,
        count: usize,
    ) -> BrokerResult<Vec<Box<dyn BackendConnection>>> {
        let mut connections = Vec::with_capacity(count);
        for _ in 0..count {
            match pool.borrow().await {
                Ok(conn) => connections.push(conn),
                Err(source) => {
                    drop(connections);
                    return Err(BrokerError::acquisition(backend, count, source));
                }
            }
        }
        Ok(connections)
    }
}
