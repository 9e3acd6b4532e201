//! Connection Registry Types

use std::fmt;

use tokio::time::Instant;
use uuid::Uuid;

use crate::transport::ConnectionHandle;

/// Opaque identifier for one live client connection.
///
/// A fresh 128-bit random value per registration; collisions are treated as
/// negligible and have no handling path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Per-connection state tracked by the registry
#[derive(Debug, Clone)]
pub struct ConnectionRecord {
    pub id: ConnectionId,
    /// Send half of this connection's outbound frame channel. Each record
    /// has its own; it is never shared between records.
    pub handle: ConnectionHandle,
    /// Last liveness signal. Only ever moves forward while the record exists.
    pub last_seen: Instant,
}

/// One entry of an immutable registry snapshot
#[derive(Debug, Clone)]
pub struct SnapshotEntry {
    pub id: ConnectionId,
    pub last_seen: Instant,
}
