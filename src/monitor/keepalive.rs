//! Heartbeat Supervisor
//!
//! Opt-in keepalive state machine: `Alive` connections that stay quiet past
//! the ping interval get a `PING` frame and move to `AwaitingPong`; a timely
//! pong revives them, a missed one marks them stale and evicts them. With
//! the supervisor disabled (the default) no connection is ever evicted for
//! staleness.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::KeepaliveConfig;
use crate::protocol::constants::TOKEN_PING;
use crate::registry::{ConnectionId, ConnectionRegistry};

/// Keepalive state for one connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeepaliveState {
    Alive,
    AwaitingPong { since: Instant },
}

/// Drives the keepalive exchange against the registry.
///
/// Supervision state lives here, keyed by connection id, and is reconciled
/// against a registry snapshot on every pass; a tick for a connection that
/// was already torn down is a safe no-op.
pub struct HeartbeatSupervisor {
    registry: Arc<ConnectionRegistry>,
    config: KeepaliveConfig,
    states: RwLock<HashMap<ConnectionId, KeepaliveState>>,
}

impl HeartbeatSupervisor {
    pub fn new(registry: Arc<ConnectionRegistry>, config: KeepaliveConfig) -> Self {
        Self {
            registry,
            config,
            states: RwLock::new(HashMap::new()),
        }
    }

    /// A pong arrived for `id`. Revives an awaiting connection and counts
    /// as a liveness signal.
    pub async fn record_pong(&self, id: ConnectionId) {
        {
            let mut states = self.states.write().await;
            match states.get_mut(&id) {
                Some(state) => {
                    if matches!(state, KeepaliveState::AwaitingPong { .. }) {
                        debug!("Connection {} answered keepalive ping", id);
                    }
                    *state = KeepaliveState::Alive;
                }
                None => return,
            }
        }
        self.registry.update_heartbeat(id).await;
    }

    /// One supervision pass: ping connections that have been quiet past the
    /// ping interval, evict those whose pong never arrived, drop state for
    /// connections the registry no longer knows.
    pub async fn tick(&self) {
        let snapshot = self.registry.snapshot().await;
        let now = Instant::now();

        let live: HashSet<ConnectionId> = snapshot.iter().map(|entry| entry.id).collect();
        let mut evict = Vec::new();

        {
            let mut states = self.states.write().await;
            states.retain(|id, _| live.contains(id));

            for entry in &snapshot {
                let state = *states.entry(entry.id).or_insert(KeepaliveState::Alive);
                match state {
                    KeepaliveState::Alive => {
                        if now.duration_since(entry.last_seen) >= self.config.ping_interval {
                            let pinged = match self.registry.lookup(entry.id).await {
                                Some(record) => record.handle.send(TOKEN_PING),
                                None => false,
                            };
                            if pinged {
                                debug!("Sent keepalive ping to {}", entry.id);
                                states.insert(entry.id, KeepaliveState::AwaitingPong { since: now });
                            }
                        }
                    }
                    KeepaliveState::AwaitingPong { since } => {
                        if now.duration_since(since) >= self.config.pong_timeout {
                            evict.push(entry.id);
                        }
                    }
                }
            }

            for id in &evict {
                states.remove(id);
            }
        }

        for id in evict {
            warn!("Connection {} missed keepalive pong, evicting as stale", id);
            // idempotent: the connection's own teardown may have raced us
            self.registry.remove(id).await;
        }
    }

    /// Spawn the supervision loop at a cadence fine enough to observe both
    /// configured durations.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        let cadence = self.config.ping_interval.min(self.config.pong_timeout);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(cadence);
            loop {
                ticker.tick().await;
                self.tick().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ConnectionHandle;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::advance;

    fn supervisor_config() -> KeepaliveConfig {
        KeepaliveConfig {
            enabled: true,
            ping_interval: Duration::from_secs(30),
            pong_timeout: Duration::from_secs(10),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn quiet_connection_gets_pinged_then_evicted_on_timeout() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = registry.register(ConnectionHandle::new(tx)).await;
        let supervisor = HeartbeatSupervisor::new(Arc::clone(&registry), supervisor_config());

        // fresh connection: nothing to do
        supervisor.tick().await;
        assert!(rx.try_recv().is_err());

        advance(Duration::from_secs(31)).await;
        supervisor.tick().await;
        assert_eq!(rx.try_recv().unwrap(), "PING");
        assert!(registry.lookup(id).await.is_some());

        advance(Duration::from_secs(11)).await;
        supervisor.tick().await;
        assert!(registry.lookup(id).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn timely_pong_revives_the_connection() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = registry.register(ConnectionHandle::new(tx)).await;
        let supervisor = HeartbeatSupervisor::new(Arc::clone(&registry), supervisor_config());

        advance(Duration::from_secs(31)).await;
        supervisor.tick().await;
        assert_eq!(rx.try_recv().unwrap(), "PING");

        supervisor.record_pong(id).await;

        advance(Duration::from_secs(11)).await;
        supervisor.tick().await;
        assert!(registry.lookup(id).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn pong_advances_the_liveness_record() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = registry.register(ConnectionHandle::new(tx)).await;
        let supervisor = HeartbeatSupervisor::new(Arc::clone(&registry), supervisor_config());

        supervisor.tick().await;
        let before = registry.lookup(id).await.unwrap().last_seen;

        advance(Duration::from_secs(5)).await;
        supervisor.record_pong(id).await;

        let after = registry.lookup(id).await.unwrap().last_seen;
        assert!(after > before);
    }

    #[tokio::test(start_paused = true)]
    async fn tick_after_teardown_is_a_no_op() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = registry.register(ConnectionHandle::new(tx)).await;
        let supervisor = HeartbeatSupervisor::new(Arc::clone(&registry), supervisor_config());

        advance(Duration::from_secs(31)).await;
        supervisor.tick().await;

        // connection goes away between ticks
        assert!(registry.remove(id).await);

        advance(Duration::from_secs(11)).await;
        supervisor.tick().await;
        supervisor.record_pong(id).await;

        assert_eq!(registry.len().await, 0);
    }
}
