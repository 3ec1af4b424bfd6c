//! The per-schema mapping from backend name to connection pool.

use crate::broker::factory::PoolFactory;
use crate::config::BackendParameters;
use crate::error::{BrokerError, BrokerResult};
use crate::pool::ConnectionPool;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Insertion-ordered, immutable mapping from backend name to its pool.
///
/// Built once at broker construction. Backends are never removed at runtime;
/// unavailable ones are filtered out of the effective view at read time.
pub struct BackendPoolRegistry {
    entries: Vec<(String, Arc<dyn ConnectionPool>)>,
}

impl BackendPoolRegistry {
    /// Build one pool per configured backend via the selected factory.
    ///
    /// All-or-nothing: if any backend fails, the whole build fails with
    /// [`BrokerError::PoolConstruction`] naming it, and no partial registry is
    /// ever exposed. Pools already built are dropped with the partial result.
    // TODO: route construction through a circuit-breaker registry source once
    // breaker semantics are settled; today only the normal source exists.
    pub async fn build(
        schema: &str,
        backends: &[(String, BackendParameters)],
        factory: &dyn PoolFactory,
    ) -> BrokerResult<Self> {
        let mut entries: Vec<(String, Arc<dyn ConnectionPool>)> =
            Vec::with_capacity(backends.len());
        for (name, params) in backends {
            if entries.iter().any(|(existing, _)| existing == name) {
                return Err(BrokerError::invalid_request(format!(
                    "duplicate backend name `{name}` in schema `{schema}`"
                )));
            }
            let pool = factory
                .build(name, params)
                .await
                .map_err(|source| BrokerError::pool_construction(name, source))?;
            debug!(schema, backend = %name, "backend pool built");
            entries.push((name.clone(), pool));
        }
        info!(schema, backends = entries.len(), "backend pool registry built");
        Ok(Self { entries })
    }

    /// Read-only view of the registry minus the disabled names, in insertion
    /// order. Recomputed on every call because the disabled set changes
    /// between calls without a registry rebuild. Disabled names that are not
    /// configured are ignored.
    pub fn effective(&self, disabled: &HashSet<String>) -> Vec<(&str, &Arc<dyn ConnectionPool>)> {
        self.entries
            .iter()
            .filter(|(name, _)| !disabled.contains(name))
            .map(|(name, pool)| (name.as_str(), pool))
            .collect()
    }

    /// Resolve one backend through the effective view.
    pub fn lookup(
        &self,
        backend: &str,
        disabled: &HashSet<String>,
    ) -> BrokerResult<Arc<dyn ConnectionPool>> {
        if disabled.contains(backend) {
            return Err(BrokerError::unknown_backend(backend));
        }
        self.entries
            .iter()
            .find(|(name, _)| name == backend)
            .map(|(_, pool)| Arc::clone(pool))
            .ok_or_else(|| BrokerError::unknown_backend(backend))
    }

    /// Every configured pool, disabled ones included. The shutdown pass
    /// iterates this.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn ConnectionPool>)> {
        self.entries
            .iter()
            .map(|(name, pool)| (name.as_str(), pool))
    }

    /// Configured backend names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Number of configured backends.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the schema has no configured backends.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
