//! Error types for the connection broker.
//!
//! This module defines all error types using `thiserror` for ergonomic error
//! handling. Pool and factory collaborators report failures as boxed errors
//! ([`PoolError`]); the broker wraps them with the backend name they concern.

use thiserror::Error;

/// Boxed error produced by pool and factory collaborators.
///
/// The broker consumes pools from heterogeneous factories, so their failure
/// types are erased at the trait boundary.
pub type PoolError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum BrokerError {
    /// Building a pool for one configured backend failed. Registry
    /// construction is all-or-nothing, so this aborts broker creation.
    #[error("cannot build connection pool for backend `{backend}`")]
    PoolConstruction {
        backend: String,
        #[source]
        source: PoolError,
    },

    /// The named backend is not in the effective registry view: either it was
    /// never configured or it is currently disabled.
    #[error("backend `{backend}` is unknown or disabled in this schema")]
    UnknownBackend { backend: String },

    /// An underlying pool failed while serving a borrow. Connections already
    /// taken in the same call were returned to the pool before this surfaced.
    #[error("failed to acquire {requested} connection(s) from backend `{backend}`")]
    ConnectionAcquisition {
        backend: String,
        requested: usize,
        #[source]
        source: PoolError,
    },

    #[error("invalid request: {message}")]
    InvalidRequest { message: String },
}

impl BrokerError {
    /// Create a pool construction error naming the offending backend.
    pub fn pool_construction(backend: impl Into<String>, source: PoolError) -> Self {
        Self::PoolConstruction {
            backend: backend.into(),
            source,
        }
    }

    /// Create an unknown backend error.
    pub fn unknown_backend(backend: impl Into<String>) -> Self {
        Self::UnknownBackend {
            backend: backend.into(),
        }
    }

    /// Create an acquisition error wrapping the underlying pool failure.
    pub fn acquisition(backend: impl Into<String>, requested: usize, source: PoolError) -> Self {
        Self::ConnectionAcquisition {
            backend: backend.into(),
            requested,
            source,
        }
    }

    /// Create an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }
}

/// Result type alias for broker operations.
pub type BrokerResult<T> = Result<T, BrokerError>;
