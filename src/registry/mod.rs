//! Connection Registry Module
//!
//! Owns the mapping from connection id to connection record.

pub mod manager;
pub mod types;

pub use manager::ConnectionRegistry;
pub use types::{ConnectionId, ConnectionRecord, SnapshotEntry};
