//! Registry Health Monitor

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::registry::ConnectionRegistry;

/// Periodic read-only observer of registry state.
///
/// Logs the connection count and each connection's liveness age on a fixed
/// cadence, independent of any single connection's events. Performs no
/// mutation; eviction belongs to the keepalive supervisor when that is
/// enabled.
pub struct HealthMonitor {
    registry: Arc<ConnectionRegistry>,
    interval: Duration,
}

impl HealthMonitor {
    pub fn new(registry: Arc<ConnectionRegistry>, interval: Duration) -> Self {
        Self { registry, interval }
    }

    /// Spawn the monitor loop. Runs for the process lifetime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                ticker.tick().await;

                let snapshot = self.registry.snapshot().await;
                if snapshot.is_empty() {
                    debug!("No connected clients");
                    continue;
                }

                info!("{} connected clients:", snapshot.len());
                for entry in &snapshot {
                    info!("  {} last seen {:?} ago", entry.id, entry.last_seen.elapsed());
                }
            }
        })
    }
}
