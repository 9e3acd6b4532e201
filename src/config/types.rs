//! Configuration Types

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub monitoring: MonitoringConfig,
    pub keepalive: KeepaliveConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub max_connections: usize,
}

/// Monitoring configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitoringConfig {
    #[serde(with = "humantime_serde")]
    pub health_interval: Duration,
    pub log_level: String,
}

/// Keepalive supervision, disabled by default.
///
/// The timeout values were never settled operationally, so both durations
/// stay configurable rather than hard-coded.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeepaliveConfig {
    pub enabled: bool,
    #[serde(with = "humantime_serde")]
    pub ping_interval: Duration,
    #[serde(with = "humantime_serde")]
    pub pong_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_addr: "127.0.0.1:3000".parse().unwrap(),
                max_connections: 1024,
            },
            monitoring: MonitoringConfig {
                health_interval: Duration::from_secs(1),
                log_level: "info".to_string(),
            },
            keepalive: KeepaliveConfig {
                enabled: false,
                ping_interval: Duration::from_secs(30),
                pong_timeout: Duration::from_secs(10),
            },
        }
    }
}
