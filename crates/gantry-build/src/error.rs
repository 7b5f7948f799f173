//! Error type for build orchestration.

use std::io;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    /// The builder executable could not be started at all.
    #[error("failed to run builder '{program}': {source}")]
    Spawn {
        program: String,
        source: io::Error,
    },

    /// The builder ran and reported failure.
    #[error("builder failed: {status}")]
    Failed { status: ExitStatus },
}

pub type Result<T> = std::result::Result<T, BuildError>;
