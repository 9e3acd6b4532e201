//! pushcore Library
//!
//! Runtime core of a real-time push server: a connection registry, a
//! control-message dispatcher, lifecycle coordination, and liveness
//! monitoring over per-client WebSocket channels.

pub mod config;
pub mod connection;
pub mod monitor;
pub mod protocol;
pub mod registry;
pub mod transport;

pub use config::Config;
pub use connection::ConnectionManager;
pub use registry::ConnectionRegistry;
pub use transport::PushServer;

/// Common error type for the push server
pub type Result<T> = anyhow::Result<T>;
