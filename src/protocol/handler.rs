//! Control Message Dispatch

use std::sync::Arc;

use tracing::{debug, error, info};

use super::types::{BusinessCommand, ControlMessage};
use crate::registry::{ConnectionId, ConnectionRegistry};

/// Classification of one dispatched frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Handled,
    Rejected,
}

/// Result of dispatching one inbound frame.
///
/// Carries the classification and the reply frame owed to the client, so
/// callers never re-derive the acknowledgement from the raw token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    pub outcome: Outcome,
    pub reply: &'static str,
}

impl Dispatch {
    pub fn is_handled(&self) -> bool {
        self.outcome == Outcome::Handled
    }
}

/// Collaborator that receives recognized business commands.
///
/// The dispatcher's contract ends at "recognized and routed"; producing
/// customer or discount payloads happens entirely behind this trait.
pub trait CommandSink: Send + Sync {
    fn deliver(&self, id: ConnectionId, command: BusinessCommand);
}

/// Sink wired in by the server binary: routed commands show up in the logs
/// and nothing else happens.
pub struct LoggingCommandSink;

impl CommandSink for LoggingCommandSink {
    fn deliver(&self, id: ConnectionId, command: BusinessCommand) {
        info!("Routing {} command from connection {}", command.token(), id);
    }
}

/// Interprets inbound control messages and applies their registry effects
pub struct MessageDispatcher {
    registry: Arc<ConnectionRegistry>,
    commands: Arc<dyn CommandSink>,
}

impl MessageDispatcher {
    pub fn new(registry: Arc<ConnectionRegistry>, commands: Arc<dyn CommandSink>) -> Self {
        Self { registry, commands }
    }

    /// Dispatch one parsed message for the given connection.
    ///
    /// A rejected frame is purely diagnostic; it never terminates the
    /// connection and causes no registry mutation.
    pub async fn dispatch(&self, id: ConnectionId, message: &ControlMessage) -> Dispatch {
        let reply = message.reply();

        let outcome = match message {
            ControlMessage::Ack => {
                // pure acknowledgement of an earlier server frame
                Outcome::Handled
            }
            ControlMessage::Ping => {
                if !self.registry.update_heartbeat(id).await {
                    debug!("Heartbeat for unknown connection {}", id);
                }
                Outcome::Handled
            }
            ControlMessage::Pong => {
                // reserved for the keepalive exchange; no effect here
                Outcome::Handled
            }
            ControlMessage::DownloadCustomers => {
                self.commands.deliver(id, BusinessCommand::DownloadCustomers);
                Outcome::Handled
            }
            ControlMessage::DownloadDiscounts => {
                self.commands.deliver(id, BusinessCommand::DownloadDiscounts);
                Outcome::Handled
            }
            ControlMessage::Invalid(token) => {
                error!("Connection {} sent unrecognized token: {:?}", id, token);
                Outcome::Rejected
            }
        };

        Dispatch { outcome, reply }
    }
}
