//! Monitoring Module
//!
//! Periodic read-only registry observation and the opt-in keepalive
//! supervisor.

pub mod health;
pub mod keepalive;

pub use health::HealthMonitor;
pub use keepalive::HeartbeatSupervisor;
