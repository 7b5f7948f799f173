//! Session modes and lifecycle states.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use gantry_project::layout;

/// What kind of tree the session fronts.
///
/// A template serves only project generation; a generated instance serves
/// build, flash and transport. The distinction is fixed when the session is
/// constructed, not re-probed per operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionMode {
    Template,
    Instance,
}

impl SessionMode {
    /// Classifies a tree by the presence of the artifact archive.
    pub fn detect(project_dir: &Path) -> Self {
        if layout::is_generated_tree(project_dir) {
            SessionMode::Instance
        } else {
            SessionMode::Template
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionMode::Template => write!(f, "template"),
            SessionMode::Instance => write!(f, "instance"),
        }
    }
}

/// Where the session stands in the target lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionState {
    /// Template mode, nothing generated yet.
    Idle,
    /// An instance tree exists but no firmware has been built.
    Generated,
    /// The firmware target has been built.
    Built,
    /// A target process is attached to the transport.
    TransportOpen,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Generated => "generated",
            SessionState::Built => "built",
            SessionState::TransportOpen => "transport-open",
        };
        write!(f, "{name}")
    }
}
