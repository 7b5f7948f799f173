//! Error type for the target transport.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    /// A target process is already attached to this transport.
    #[error("transport is already open")]
    AlreadyOpen,

    /// No target process is attached, or the peer went away. The transport
    /// is torn down and may be opened again.
    #[error("transport is closed")]
    Closed,

    /// The per-call deadline expired before the stream became ready. The
    /// transport stays open; the call may simply be retried.
    #[error("transport i/o timed out")]
    IoTimeout,

    /// The target process could not be started.
    #[error("failed to spawn target '{program}': {source}")]
    Spawn {
        program: String,
        source: io::Error,
    },

    /// An unrecoverable stream error.
    #[error("transport i/o failed: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
