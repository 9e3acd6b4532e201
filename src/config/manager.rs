//! Configuration Manager

use super::Config;
use crate::Result;
use anyhow::{bail, Context};
use std::net::SocketAddr;
use std::path::Path;

/// Manages configuration loading and validation
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from file
    pub fn load_from_file(path: &Path) -> Result<Config> {
        if path.exists() {
            tracing::info!("Loading configuration from: {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;

            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

            config
                .validate()
                .with_context(|| "Configuration validation failed")?;

            tracing::info!("Configuration loaded and validated successfully");
            Ok(config)
        } else {
            tracing::warn!(
                "Configuration file not found at {}, using defaults",
                path.display()
            );
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }

    /// Load configuration from environment variables
    pub fn load_from_env() -> Result<Config> {
        let mut config = Config::default();

        if let Ok(bind_addr) = std::env::var("PUSHCORE_BIND_ADDR") {
            config.server.bind_addr = bind_addr
                .parse::<SocketAddr>()
                .with_context(|| format!("Invalid PUSHCORE_BIND_ADDR: {}", bind_addr))?;
        }

        if let Ok(max_conn) = std::env::var("PUSHCORE_MAX_CONNECTIONS") {
            config.server.max_connections = max_conn
                .parse::<usize>()
                .with_context(|| format!("Invalid PUSHCORE_MAX_CONNECTIONS: {}", max_conn))?;
        }

        if let Ok(interval) = std::env::var("PUSHCORE_HEALTH_INTERVAL") {
            config.monitoring.health_interval = humantime::parse_duration(&interval)
                .with_context(|| format!("Invalid PUSHCORE_HEALTH_INTERVAL: {}", interval))?;
        }

        if let Ok(log_level) = std::env::var("PUSHCORE_LOG_LEVEL") {
            config.monitoring.log_level = log_level;
        }

        if let Ok(enabled) = std::env::var("PUSHCORE_KEEPALIVE_ENABLED") {
            config.keepalive.enabled = enabled
                .parse::<bool>()
                .with_context(|| format!("Invalid PUSHCORE_KEEPALIVE_ENABLED: {}", enabled))?;
        }

        if let Ok(interval) = std::env::var("PUSHCORE_PING_INTERVAL") {
            config.keepalive.ping_interval = humantime::parse_duration(&interval)
                .with_context(|| format!("Invalid PUSHCORE_PING_INTERVAL: {}", interval))?;
        }

        if let Ok(timeout) = std::env::var("PUSHCORE_PONG_TIMEOUT") {
            config.keepalive.pong_timeout = humantime::parse_duration(&timeout)
                .with_context(|| format!("Invalid PUSHCORE_PONG_TIMEOUT: {}", timeout))?;
        }

        config.validate()?;
        Ok(config)
    }
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.max_connections == 0 {
            bail!("max_connections must be greater than 0");
        }

        if self.server.max_connections > 100_000 {
            bail!("max_connections cannot exceed 100,000 for safety");
        }

        if self.monitoring.health_interval.is_zero() {
            bail!("health_interval must be greater than 0");
        }

        if self.keepalive.enabled {
            if self.keepalive.ping_interval.is_zero() {
                bail!("keepalive ping_interval must be greater than 0");
            }
            if self.keepalive.pong_timeout.is_zero() {
                bail!("keepalive pong_timeout must be greater than 0");
            }
        }

        Ok(())
    }

    /// Apply command-line overrides (highest priority)
    pub fn merge_with_cli_args(
        &mut self,
        bind: Option<&str>,
        port: Option<u16>,
        max_connections: Option<usize>,
    ) {
        if let Some(bind) = bind {
            match bind.parse::<SocketAddr>() {
                Ok(addr) => self.server.bind_addr = addr,
                Err(_) => tracing::warn!("Ignoring invalid --bind value: {}", bind),
            }
        }

        if let Some(port) = port {
            self.server.bind_addr.set_port(port);
        }

        if let Some(max) = max_connections {
            self.server.max_connections = max;
        }
    }
}
