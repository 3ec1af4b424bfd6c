//! Shared view of backends the topology collaborator has taken out of rotation.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

/// Cloneable handle to the set of currently disabled backend names.
///
/// The topology/health collaborator mutates this set (for example when a
/// health check trips a circuit breaker); the broker reads a fresh snapshot on
/// every acquisition, so membership changes take effect without a registry
/// rebuild. Disabling a backend filters it from the effective view; the pool
/// itself stays owned by the registry until shutdown.
#[derive(Debug, Clone, Default)]
pub struct DisabledBackends {
    inner: Arc<RwLock<HashSet<String>>>,
}

impl DisabledBackends {
    /// Create an empty set: every configured backend is in rotation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a backend as disabled.
    pub fn disable(&self, backend: &str) {
        if let Ok(mut set) = self.inner.write() {
            set.insert(backend.to_string());
        }
    }

    /// Return a backend to rotation.
    pub fn enable(&self, backend: &str) {
        if let Ok(mut set) = self.inner.write() {
            set.remove(backend);
        }
    }

    /// Check whether a backend is currently disabled.
    pub fn is_disabled(&self, backend: &str) -> bool {
        self.inner
            .read()
            .map(|set| set.contains(backend))
            .unwrap_or(false)
    }

    /// Take a point-in-time copy of the disabled names.
    pub fn snapshot(&self) -> HashSet<String> {
        self.inner.read().map(|set| set.clone()).unwrap_or_default()
    }
}
