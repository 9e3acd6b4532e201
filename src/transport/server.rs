//! WebSocket Accept Loop

use std::sync::Arc;

use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use super::ConnectionHandle;
use crate::config::Config;
use crate::connection::ConnectionManager;
use crate::registry::ConnectionRegistry;
use crate::Result;

/// Accepts WebSocket clients and adapts socket events onto the lifecycle
/// coordinator. One read task and one write task per connection, so each
/// connection's own events are handled in delivery order.
pub struct PushServer {
    config: Arc<Config>,
    registry: Arc<ConnectionRegistry>,
    manager: Arc<ConnectionManager>,
}

impl PushServer {
    pub fn new(
        config: Arc<Config>,
        registry: Arc<ConnectionRegistry>,
        manager: Arc<ConnectionManager>,
    ) -> Self {
        Self {
            config,
            registry,
            manager,
        }
    }

    /// Bind and run the accept loop. Runs until the process exits; released
    /// connections are the process's concern, there is no drain.
    pub async fn run(&self) -> Result<()> {
        let bind_addr = self.config.server.bind_addr;

        info!("Binding TCP listener to {}", bind_addr);
        let listener = TcpListener::bind(bind_addr)
            .await
            .with_context(|| format!("Failed to bind {}", bind_addr))?;
        info!("Listening for WebSocket clients on {}", bind_addr);

        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    debug!("Accepted TCP connection from {}", addr);

                    if self.registry.len().await >= self.config.server.max_connections {
                        warn!("Connection limit reached, refusing {}", addr);
                        continue;
                    }

                    let manager = Arc::clone(&self.manager);
                    tokio::spawn(async move {
                        if let Err(e) = Self::serve_connection(stream, manager).await {
                            debug!("Connection from {} ended: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                    // keep accepting even if one handshake fails
                }
            }
        }
    }

    /// Upgrade one socket and pump its events into the coordinator.
    async fn serve_connection(stream: TcpStream, manager: Arc<ConnectionManager>) -> Result<()> {
        let ws_stream = tokio_tungstenite::accept_async(stream)
            .await
            .context("WebSocket handshake failed")?;
        let (mut sink, mut source) = ws_stream.split();

        let (frames_tx, mut frames_rx) = mpsc::unbounded_channel::<String>();
        let id = manager.on_connect(ConnectionHandle::new(frames_tx)).await;
        // the registry record now owns the only sender; removing the record
        // closes the channel, which ends the write task below

        let writer = tokio::spawn(async move {
            while let Some(frame) = frames_rx.recv().await {
                if sink.send(Message::Text(frame)).await.is_err() {
                    break;
                }
            }
            let _ = sink.send(Message::Close(None)).await;
        });

        loop {
            match source.next().await {
                Some(Ok(Message::Text(token))) => {
                    debug!("Received message from {}: {}", id, token);
                    manager.on_message(id, &token).await;
                }
                Some(Ok(Message::Binary(_))) => {
                    debug!("Ignoring binary frame from {}", id);
                }
                Some(Ok(Message::Close(_))) | None => {
                    manager.on_close(id).await;
                    break;
                }
                Some(Ok(_)) => {
                    // transport-level ping/pong frames, answered by tungstenite
                }
                Some(Err(e)) => {
                    manager.on_error(id, e).await;
                    break;
                }
            }
        }

        let _ = writer.await;
        Ok(())
    }
}
