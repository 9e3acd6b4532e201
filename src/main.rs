//! pushcore - Real-Time Push Server
//!
//! Tracks live WebSocket clients in a connection registry and answers a
//! small fixed vocabulary of control messages.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pushcore::{
    config::ConfigManager,
    monitor::{HealthMonitor, HeartbeatSupervisor},
    protocol::{LoggingCommandSink, MessageDispatcher},
    ConnectionManager, ConnectionRegistry, PushServer,
};

/// CLI arguments for pushcore
#[derive(Parser, Debug)]
#[command(name = "pushcore")]
#[command(about = "pushcore - Real-time push server")]
#[command(version)]
#[command(long_about = "
pushcore - Real-time push server

Tracks live WebSocket clients in a connection registry and interprets the
flat-token control protocol (ACK, PING, PONG, DOWNLOAD_CUSTOMERS,
DOWNLOAD_DISCOUNTS).

Configuration priority (highest to lowest):
1. Command-line arguments
2. Configuration file
3. Environment variables
4. Built-in defaults

Environment variables:
  PUSHCORE_BIND_ADDR         - Bind address (e.g., 127.0.0.1:3000)
  PUSHCORE_MAX_CONNECTIONS   - Maximum concurrent connections
  PUSHCORE_HEALTH_INTERVAL   - Health monitor cadence (e.g., 1s, 500ms)
  PUSHCORE_LOG_LEVEL         - Log level (trace, debug, info, warn, error)
  PUSHCORE_KEEPALIVE_ENABLED - Enable keepalive supervision (true/false)
  PUSHCORE_PING_INTERVAL     - Keepalive ping interval (e.g., 30s)
  PUSHCORE_PONG_TIMEOUT      - Keepalive pong timeout (e.g., 10s)
")]
pub struct CliArgs {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "config.toml",
        help = "Path to configuration file"
    )]
    pub config: PathBuf,

    /// Bind address (overrides config file)
    #[arg(short, long, help = "Bind address (e.g., 127.0.0.1:3000)")]
    pub bind: Option<String>,

    /// Port to bind to (overrides config file)
    #[arg(short, long, help = "Port to bind to")]
    pub port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", help = "Log level")]
    pub log_level: String,

    /// Enable verbose logging (sets log level to debug)
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Maximum number of concurrent connections
    #[arg(long, help = "Maximum number of concurrent connections")]
    pub max_connections: Option<usize>,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration and exit")]
    pub validate_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    init_tracing(&args)?;

    info!(
        "Starting pushcore v{} - Real-time push server",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration with priority: CLI args > config file > environment > defaults
    let mut config = if args.config.exists() {
        ConfigManager::load_from_file(&args.config)?
    } else {
        info!("Config file not found, checking environment variables");
        ConfigManager::load_from_env()?
    };

    config.merge_with_cli_args(args.bind.as_deref(), args.port, args.max_connections);

    config
        .validate()
        .context("Final configuration validation failed")?;

    if args.validate_config {
        info!("Configuration is valid");
        info!("Configuration summary:");
        info!("  Bind address: {}", config.server.bind_addr);
        info!("  Max connections: {}", config.server.max_connections);
        info!("  Health interval: {:?}", config.monitoring.health_interval);
        info!(
            "  Keepalive: {}",
            if config.keepalive.enabled {
                "enabled"
            } else {
                "disabled"
            }
        );
        return Ok(());
    }

    info!("Configuration loaded successfully");
    info!("Bind address: {}", config.server.bind_addr);
    info!("Max connections: {}", config.server.max_connections);

    let config = Arc::new(config);

    // process-wide registry, constructed once and injected everywhere
    let registry = Arc::new(ConnectionRegistry::new());

    let dispatcher = MessageDispatcher::new(Arc::clone(&registry), Arc::new(LoggingCommandSink));
    let mut manager = ConnectionManager::new(Arc::clone(&registry), dispatcher);

    if config.keepalive.enabled {
        info!(
            "Keepalive supervision enabled (ping every {:?}, pong timeout {:?})",
            config.keepalive.ping_interval, config.keepalive.pong_timeout
        );
        let supervisor = Arc::new(HeartbeatSupervisor::new(
            Arc::clone(&registry),
            config.keepalive.clone(),
        ));
        manager = manager.with_keepalive(Arc::clone(&supervisor));
        supervisor.spawn();
    }

    HealthMonitor::new(Arc::clone(&registry), config.monitoring.health_interval).spawn();

    let server = PushServer::new(
        Arc::clone(&config),
        Arc::clone(&registry),
        Arc::new(manager),
    );

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        result = shutdown_signal() => {
            if let Err(e) = result {
                error!("Error setting up signal handlers: {}", e);
            }
            info!("Shutdown signal received, exiting");
        }
    }

    // connections are released by process termination; there is no drain
    Ok(())
}

/// Wait for SIGTERM/SIGINT (Ctrl+C on Windows)
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C");
            }
        }
    }

    #[cfg(windows)]
    {
        tokio::signal::ctrl_c().await?;
        info!("Received Ctrl+C");
    }

    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(args: &CliArgs) -> Result<()> {
    let log_level = if args.verbose {
        "debug"
    } else {
        &args.log_level
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(true),
        )
        .with(env_filter)
        .init();

    Ok(())
}
