//! Connection Registry Implementation

use std::collections::HashMap;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use super::types::{ConnectionId, ConnectionRecord, SnapshotEntry};
use crate::transport::ConnectionHandle;

/// Authoritative mapping from connection id to connection record.
///
/// Constructed once at startup and handed by `Arc` to every component that
/// needs it. A record exists exactly while the connection is considered
/// live. All mutation is serialized by the inner lock; no operation here
/// performs I/O.
pub struct ConnectionRegistry {
    records: RwLock<HashMap<ConnectionId, ConnectionRecord>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection and return its fresh identifier.
    pub async fn register(&self, handle: ConnectionHandle) -> ConnectionId {
        let id = ConnectionId::generate();
        let record = ConnectionRecord {
            id,
            handle,
            last_seen: Instant::now(),
        };

        let mut records = self.records.write().await;
        records.insert(id, record);
        debug!("Registered connection {}", id);

        id
    }

    /// Look up a record by id. Pure read; `last_seen` is not touched. The
    /// returned record is a copy, so callers cannot mutate registry state
    /// through it.
    pub async fn lookup(&self, id: ConnectionId) -> Option<ConnectionRecord> {
        let records = self.records.read().await;
        records.get(&id).cloned()
    }

    /// Delete the record for `id` if present. Returns whether a record was
    /// actually removed; calling this for an unknown or already-removed id
    /// is a safe no-op.
    pub async fn remove(&self, id: ConnectionId) -> bool {
        let mut records = self.records.write().await;
        records.remove(&id).is_some()
    }

    /// Advance `last_seen` to now for a live connection. Returns false and
    /// leaves all state untouched if the id is unknown.
    pub async fn update_heartbeat(&self, id: ConnectionId) -> bool {
        let mut records = self.records.write().await;
        match records.get_mut(&id) {
            Some(record) => {
                record.last_seen = Instant::now();
                true
            }
            None => false,
        }
    }

    /// An immutable copy of the current `(id, last_seen)` pairs. Never the
    /// live mapping; enumeration order carries no meaning.
    pub async fn snapshot(&self) -> Vec<SnapshotEntry> {
        let records = self.records.read().await;
        records
            .values()
            .map(|record| SnapshotEntry {
                id: record.id,
                last_seen: record.last_seen,
            })
            .collect()
    }

    /// Number of live connections
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
