//! Connection Lifecycle Coordination

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::monitor::keepalive::HeartbeatSupervisor;
use crate::protocol::{ControlMessage, MessageDispatcher};
use crate::registry::{ConnectionId, ConnectionRegistry};
use crate::transport::ConnectionHandle;

/// Coordinates connection lifecycle against the registry.
///
/// Both teardown paths (graceful close and transport error) converge on the
/// registry's idempotent `remove`, so a race between them, or a duplicate
/// firing of either, is harmless.
pub struct ConnectionManager {
    registry: Arc<ConnectionRegistry>,
    dispatcher: MessageDispatcher,
    keepalive: Option<Arc<HeartbeatSupervisor>>,
}

impl ConnectionManager {
    pub fn new(registry: Arc<ConnectionRegistry>, dispatcher: MessageDispatcher) -> Self {
        Self {
            registry,
            dispatcher,
            keepalive: None,
        }
    }

    /// Attach the opt-in keepalive supervisor. Without it, inbound pongs
    /// stay no-ops and nothing is ever evicted for staleness.
    pub fn with_keepalive(mut self, supervisor: Arc<HeartbeatSupervisor>) -> Self {
        self.keepalive = Some(supervisor);
        self
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// A new duplex channel was established. Returns the id that all
    /// subsequent frames from this channel are correlated with.
    pub async fn on_connect(&self, handle: ConnectionHandle) -> ConnectionId {
        let id = self.registry.register(handle).await;
        info!("New client connected: {}", id);
        id
    }

    /// One inbound frame. Parses the token, dispatches it, and sends exactly
    /// one reply frame back through the record's handle, chosen by the
    /// dispatcher.
    pub async fn on_message(&self, id: ConnectionId, raw: &str) {
        let message = ControlMessage::from_token(raw);
        let dispatch = self.dispatcher.dispatch(id, &message).await;

        if let Some(supervisor) = &self.keepalive {
            if message == ControlMessage::Pong {
                supervisor.record_pong(id).await;
            }
        }

        match self.registry.lookup(id).await {
            Some(record) => {
                if !record.handle.send(dispatch.reply) {
                    debug!("Reply to {} dropped, write half already gone", id);
                }
            }
            None => debug!("Reply to unregistered connection {} dropped", id),
        }
    }

    /// Graceful close from the client side.
    pub async fn on_close(&self, id: ConnectionId) {
        if self.registry.remove(id).await {
            info!("Client {} disconnected", id);
        } else {
            debug!("Close event for already-removed connection {}", id);
        }
    }

    /// Transport error. Terminal for this connection only; the same teardown
    /// as a graceful close and never an escalation to process level.
    pub async fn on_error(&self, id: ConnectionId, cause: impl fmt::Display) {
        error!("Error on connection {}: {}", id, cause);
        if !self.registry.remove(id).await {
            debug!("Error teardown for already-removed connection {}", id);
        }
    }
}
