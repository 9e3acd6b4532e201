//! Control Protocol Constants

/// Plain acknowledgement of an earlier frame
pub const TOKEN_ACK: &str = "ACK";

/// Client liveness signal
pub const TOKEN_PING: &str = "PING";

/// Keepalive response, reserved for the server-initiated exchange
pub const TOKEN_PONG: &str = "PONG";

/// Request to produce customer data, routed to the business collaborator
pub const TOKEN_DOWNLOAD_CUSTOMERS: &str = "DOWNLOAD_CUSTOMERS";

/// Request to produce discount data, routed to the business collaborator
pub const TOKEN_DOWNLOAD_DISCOUNTS: &str = "DOWNLOAD_DISCOUNTS";
