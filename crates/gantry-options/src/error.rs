//! Error type for option resolution.

use thiserror::Error;

use crate::spec::{OptionType, Stage};

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A stage-required option has neither a supplied value nor a default.
    #[error("missing required option '{name}' for stage {stage}")]
    Missing { name: String, stage: Stage },

    /// A supplied value does not carry the declared type.
    #[error("option '{name}' expects a {expected} value")]
    WrongType { name: String, expected: OptionType },

    /// A supplied key is not declared by any stage of the schema.
    #[error("unrecognized option '{name}'")]
    Unknown { name: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
