//! Pool and connection contracts consumed by the broker.
//!
//! Pools come from heterogeneous factories that share no common lifecycle
//! contract, so shutdown is an explicit opt-in capability ([`ClosablePool`])
//! rather than a method every pool must carry.

pub mod sqlx_pool;

pub use crate::error::PoolError;
pub use sqlx_pool::{RawPoolFactory, SqlxConnection, SqlxPool, XaPoolFactory};

use async_trait::async_trait;
use std::any::Any;

/// A live connection checked out of a backend pool.
///
/// Ownership passes entirely to the caller; the broker never retains acquired
/// connections. Dropping the boxed connection returns it to the pool it came
/// from.
pub trait BackendConnection: Send + Any {
    /// Downcast hook for the execution layer to reach the driver connection.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl std::fmt::Debug for dyn BackendConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BackendConnection")
    }
}

/// A pool of reusable live connections to one physical backend.
#[async_trait]
pub trait ConnectionPool: Send + Sync {
    /// Borrow one live connection.
    ///
    /// Awaits until the pool can serve it or the pool's own acquire timeout
    /// elapses; the broker adds no timeout of its own.
    async fn borrow(&self) -> Result<Box<dyn BackendConnection>, PoolError>;

    /// Declare the optional shutdown capability.
    ///
    /// Pools that can be closed return `Some(self)`; the default declares no
    /// such capability and the lifecycle pass skips the pool.
    fn as_closable(&self) -> Option<&dyn ClosablePool> {
        None
    }
}

impl std::fmt::Debug for dyn ConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ConnectionPool")
    }
}

/// Optional capability a pool implementation may declare to participate in
/// broker shutdown.
#[async_trait]
pub trait ClosablePool: Send + Sync {
    /// Close the pool. Errors are logged and suppressed by the caller; at
    /// teardown time there is no actionable recovery.
    async fn close(&self) -> Result<(), PoolError>;
}
