//! Control Protocol Types

use crate::protocol::constants::*;

/// One inbound control message, parsed once at the transport boundary.
///
/// The vocabulary is closed. Anything outside it parses to `Invalid` and is
/// classified as a protocol violation downstream instead of falling through
/// ad hoc string comparisons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlMessage {
    Ack,
    Ping,
    Pong,
    DownloadCustomers,
    DownloadDiscounts,
    Invalid(String),
}

impl ControlMessage {
    /// Parse a flat wire token. There is no structured envelope.
    pub fn from_token(token: &str) -> Self {
        match token {
            TOKEN_ACK => ControlMessage::Ack,
            TOKEN_PING => ControlMessage::Ping,
            TOKEN_PONG => ControlMessage::Pong,
            TOKEN_DOWNLOAD_CUSTOMERS => ControlMessage::DownloadCustomers,
            TOKEN_DOWNLOAD_DISCOUNTS => ControlMessage::DownloadDiscounts,
            other => ControlMessage::Invalid(other.to_string()),
        }
    }

    /// The single reply frame owed for this message: `PONG` answers `PING`,
    /// everything else is acknowledged with `ACK`.
    pub fn reply(&self) -> &'static str {
        match self {
            ControlMessage::Ping => TOKEN_PONG,
            _ => TOKEN_ACK,
        }
    }
}

/// Business commands the core recognizes and routes but never processes.
/// Producing the actual payload is the collaborator's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusinessCommand {
    DownloadCustomers,
    DownloadDiscounts,
}

impl BusinessCommand {
    /// The wire token this command was carried by
    pub fn token(&self) -> &'static str {
        match self {
            BusinessCommand::DownloadCustomers => TOKEN_DOWNLOAD_CUSTOMERS,
            BusinessCommand::DownloadDiscounts => TOKEN_DOWNLOAD_DISCOUNTS,
        }
    }
}
