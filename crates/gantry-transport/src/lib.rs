//! Non-blocking byte transport to a simulated target process.
//!
//! The target runs as a child process; its standard pipes carry the session
//! byte stream. Both pipe ends are switched to non-blocking mode right after
//! spawn, and every read or write first waits for fd readiness under the
//! caller's deadline. A deadline that expires is a recoverable timeout; a
//! peer that goes away tears the transport down and leaves it ready to be
//! opened again.

pub mod command;
pub mod error;
mod nonblock;
pub mod transport;

pub use command::TargetCommand;
pub use error::{Result, TransportError};
pub use transport::{TargetTransport, TransportTimeouts};
