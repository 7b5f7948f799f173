//! Session self-description, served to callers and the CLI.

use std::path::PathBuf;

use serde::Serialize;

use gantry_options::OptionSpec;

use crate::state::{SessionMode, SessionState};

/// Snapshot of what the session is and what it accepts.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub platform_name: String,
    pub version: String,
    pub mode: SessionMode,
    pub state: SessionState,
    /// Path of the model artifact archive; present only for instances.
    pub artifact: Option<PathBuf>,
    /// The full option table across all stages.
    pub options: Vec<OptionSpec>,
}
