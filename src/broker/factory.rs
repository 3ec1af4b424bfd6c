//! Pool factory selection keyed by transaction mode.
//!
//! The mapping from mode to factory is an open registry rather than a branch:
//! adding a transaction mode means one `register` call, not an edit to every
//! selection site.

use crate::config::BackendParameters;
use crate::error::PoolError;
use crate::pool::{ConnectionPool, RawPoolFactory, XaPoolFactory};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Transaction mode a schema instance runs under.
///
/// Read once per broker construction to select the pool factory; schema
/// instances running concurrently in one process may use different modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionMode {
    /// Plain local transactions.
    #[default]
    Local,
    /// Two-phase distributed transactions.
    Xa,
    /// Eventually-consistent distributed transactions.
    Base,
}

impl std::fmt::Display for TransactionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "LOCAL"),
            Self::Xa => write!(f, "XA"),
            Self::Base => write!(f, "BASE"),
        }
    }
}

/// Builds one connection pool for one named backend.
#[async_trait]
pub trait PoolFactory: Send + Sync {
    /// Build a pool for the backend, failing on invalid parameters or an
    /// unreachable target.
    async fn build(
        &self,
        name: &str,
        params: &BackendParameters,
    ) -> Result<Arc<dyn ConnectionPool>, PoolError>;
}

/// Mode-keyed factory mapping with an explicit fallback.
///
/// Selection is a pure lookup and cannot fail: modes without a registered
/// factory get the fallback.
pub struct FactoryRegistry {
    factories: HashMap<TransactionMode, Arc<dyn PoolFactory>>,
    fallback: Arc<dyn PoolFactory>,
}

impl FactoryRegistry {
    /// Create an empty registry around a fallback factory.
    pub fn new(fallback: Arc<dyn PoolFactory>) -> Self {
        Self {
            factories: HashMap::new(),
            fallback,
        }
    }

    /// Registry with the stock wiring: XA mode gets [`XaPoolFactory`], every
    /// other mode falls back to [`RawPoolFactory`].
    pub fn with_defaults() -> Self {
        let mut registry = Self::new(Arc::new(RawPoolFactory));
        registry.register(TransactionMode::Xa, Arc::new(XaPoolFactory));
        registry
    }

    /// Map a transaction mode to a factory, replacing any previous mapping.
    pub fn register(&mut self, mode: TransactionMode, factory: Arc<dyn PoolFactory>) {
        self.factories.insert(mode, factory);
    }

    /// Select the factory for a mode; unmapped modes get the fallback.
    pub fn select(&self, mode: TransactionMode) -> Arc<dyn PoolFactory> {
        self.factories
            .get(&mode)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.fallback))
    }
}

impl Default for FactoryRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
