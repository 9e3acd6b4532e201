//! Transport Boundary
//!
//! Per-connection duplex channel plumbing between the WebSocket shell and
//! the runtime core. The core only ever sees a `ConnectionHandle` for
//! sending frames; sockets, upgrades, and framing stay on this side.

pub mod server;

pub use server::PushServer;

use tokio::sync::mpsc;

/// Send half of a connection's outbound frame channel.
///
/// The connection's write task owns the receive half and drains it onto the
/// socket. The registry record holds the only sender, so removing the record
/// closes the channel and lets the write task shut the socket down.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    frames: mpsc::UnboundedSender<String>,
}

impl ConnectionHandle {
    pub fn new(frames: mpsc::UnboundedSender<String>) -> Self {
        Self { frames }
    }

    /// Queue one frame for delivery. Returns false if the write task is
    /// already gone; delivery is best effort.
    pub fn send(&self, frame: impl Into<String>) -> bool {
        self.frames.send(frame.into()).is_ok()
    }
}
