//! Control Protocol Module
//!
//! Token vocabulary, parsing, and message dispatch.

pub mod constants;
pub mod handler;
pub mod types;

pub use handler::{CommandSink, Dispatch, LoggingCommandSink, MessageDispatcher, Outcome};
pub use types::{BusinessCommand, ControlMessage};
