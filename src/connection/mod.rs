//! Connection Lifecycle Module
//!
//! Reacts to connect, message, close, and error events from the transport
//! boundary.

pub mod manager;

pub use manager::ConnectionManager;
