//! Shard Broker Library
//!
//! This library provides the per-logical-schema connection broker used inside
//! a sharding database proxy. It owns one physical connection pool per backend
//! shard, selects the pool factory from the schema's transaction mode, and
//! hands out raw connections under two acquisition strictness disciplines.
//!
//! The broker does not route SQL, plan queries, or aggregate results; the
//! query-execution layer above it does that with the connections it hands out.

pub mod broker;
pub mod config;
pub mod error;
pub mod pool;
pub mod topology;

pub use broker::{
    BackendConnectionBroker, BackendPoolRegistry, ConnectionStrictness, FactoryRegistry,
    PoolFactory, TransactionMode,
};
pub use config::{BackendParameters, PoolSizing};
pub use error::{BrokerError, BrokerResult, PoolError};
pub use pool::{BackendConnection, ClosablePool, ConnectionPool};
pub use topology::DisabledBackends;
