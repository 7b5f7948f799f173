//! Error type for the session layer.

use thiserror::Error;

use gantry_build::BuildError;
use gantry_options::ConfigError;
use gantry_project::GenerateError;
use gantry_transport::TransportError;

use crate::state::SessionState;

#[derive(Debug, Error)]
pub enum SessionError {
    /// The operation is not legal in the session's current state.
    #[error("operation '{operation}' is illegal in state {state}")]
    IllegalTransition {
        operation: &'static str,
        state: SessionState,
    },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("generation error: {0}")]
    Generate(#[from] GenerateError),

    #[error("build error: {0}")]
    Build(#[from] BuildError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
