//! Best-effort shutdown of heterogeneous pools.

use crate::broker::registry::BackendPoolRegistry;
use tracing::{debug, info, warn};

/// Close every pool in the full registry once, disabled backends included.
///
/// Pools opt in to shutdown through
/// [`ClosablePool`](crate::pool::ClosablePool); a pool that declares no such
/// capability, or that fails while closing, is skipped so the remaining pools
/// still get their pass. At teardown time there is no actionable recovery, so
/// failures are logged and suppressed, never surfaced.
pub(crate) async fn close_all(registry: &BackendPoolRegistry) {
    for (name, pool) in registry.iter() {
        match pool.as_closable() {
            Some(closable) => match closable.close().await {
                Ok(()) => debug!(backend = %name, "backend pool closed"),
                Err(error) => {
                    warn!(backend = %name, %error, "backend pool failed to close, skipping")
                }
            },
            None => debug!(backend = %name, "backend pool has no shutdown capability, skipping"),
        }
    }
    info!(backends = registry.len(), "backend pool shutdown pass complete");
}
