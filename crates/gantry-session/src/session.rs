//! The session facade over one project tree.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use gantry_build::{BuildRunner, BUILD_TARGET};
use gantry_options::{OptionSchema, OptionValue, Stage};
use gantry_project::{layout, ProjectGenerator};
use gantry_transport::{TargetCommand, TargetTransport, TransportError, TransportTimeouts};

use crate::error::{Result, SessionError};
use crate::info::SessionInfo;
use crate::state::{SessionMode, SessionState};

/// Name this harness advertises to orchestrators.
pub const PLATFORM_NAME: &str = "spike";

/// One session over one project tree.
///
/// Stage operations (generate, build, flash, open) are gated on the session
/// state. The byte-stream operations are not: they delegate to the transport
/// in any state and let it report its own condition, so a target that died
/// mid-session surfaces exactly where the caller touches the stream.
pub struct Session {
    project_dir: PathBuf,
    mode: SessionMode,
    state: SessionState,
    schema: OptionSchema,
    builder_program: Option<String>,
    transport: TargetTransport,
}

impl Session {
    /// Opens a session over `project_dir` in an explicitly chosen mode.
    pub fn new(project_dir: impl Into<PathBuf>, mode: SessionMode) -> Self {
        let state = match mode {
            SessionMode::Template => SessionState::Idle,
            SessionMode::Instance => SessionState::Generated,
        };
        Session::with_state(project_dir.into(), mode, state)
    }

    /// Opens a session over `project_dir`, classifying the tree once: the
    /// artifact archive marks an instance, the built firmware marks it
    /// already built. No further probing happens after construction.
    pub fn discover(project_dir: impl Into<PathBuf>) -> Self {
        let project_dir = project_dir.into();
        let mode = SessionMode::detect(&project_dir);
        let state = match mode {
            SessionMode::Template => SessionState::Idle,
            SessionMode::Instance if project_dir.join(BUILD_TARGET).is_file() => {
                SessionState::Built
            }
            SessionMode::Instance => SessionState::Generated,
        };
        debug!(project_dir = %project_dir.display(), %mode, %state, "discovered session");
        Session::with_state(project_dir, mode, state)
    }

    fn with_state(project_dir: PathBuf, mode: SessionMode, state: SessionState) -> Self {
        Session {
            project_dir,
            mode,
            state,
            schema: OptionSchema::builtin(),
            builder_program: None,
            transport: TargetTransport::new(),
        }
    }

    /// Substitutes the builder program for systems where GNU make goes by
    /// another name.
    pub fn with_builder_program(mut self, program: impl Into<String>) -> Self {
        self.builder_program = Some(program.into());
        self
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn schema(&self) -> &OptionSchema {
        &self.schema
    }

    /// Describes the harness: platform, mode, state, artifact, option table.
    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            platform_name: PLATFORM_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            mode: self.mode,
            state: self.state,
            artifact: match self.mode {
                SessionMode::Instance => {
                    Some(layout::artifact_archive_path(&self.project_dir))
                }
                SessionMode::Template => None,
            },
            options: self.schema.specs().to_vec(),
        }
    }

    /// Generates a project instance at `dest` and re-roots the session
    /// there: the session leaves template mode and continues over the
    /// instance it just produced.
    pub fn generate_project(
        &mut self,
        artifact: &Path,
        runtime_dir: &Path,
        dest: &Path,
        supplied: &HashMap<String, OptionValue>,
    ) -> Result<()> {
        self.ensure("generate_project", &[SessionState::Idle])?;
        let options = self.schema.resolve(Stage::GenerateProject, supplied)?;
        ProjectGenerator::new(&self.project_dir).generate(artifact, runtime_dir, dest, &options)?;
        self.project_dir = dest.to_path_buf();
        self.mode = SessionMode::Instance;
        self.state = SessionState::Generated;
        info!(instance = %self.project_dir.display(), "session re-rooted at generated instance");
        Ok(())
    }

    /// Builds the firmware target. Legal once generated; rebuilding a built
    /// instance is fine.
    pub fn build(&mut self, supplied: &HashMap<String, OptionValue>) -> Result<()> {
        self.ensure("build", &[SessionState::Generated, SessionState::Built])?;
        let options = self.schema.resolve(Stage::Build, supplied)?;
        let mut runner = BuildRunner::new(&self.project_dir);
        if let Some(program) = &self.builder_program {
            runner = runner.with_program(program.clone());
        }
        runner.build(&options)?;
        self.state = SessionState::Built;
        Ok(())
    }

    /// Flashes the built firmware. The simulator boots the binary itself
    /// when the transport opens, so this validates options and does nothing
    /// else.
    pub fn flash(&mut self, supplied: &HashMap<String, OptionValue>) -> Result<()> {
        self.ensure("flash", &[SessionState::Built])?;
        let _options = self.schema.resolve(Stage::Flash, supplied)?;
        debug!("flash is a no-op for the spike simulator");
        Ok(())
    }

    /// Spawns the simulator around the built firmware and attaches the byte
    /// stream.
    pub fn open_transport(
        &mut self,
        supplied: &HashMap<String, OptionValue>,
    ) -> Result<TransportTimeouts> {
        self.ensure("open_transport", &[SessionState::Built])?;
        let options = self.schema.resolve(Stage::OpenTransport, supplied)?;
        let command =
            TargetCommand::from_options(&options, &self.project_dir, Path::new(BUILD_TARGET));
        let timeouts = self.transport.open(command)?;
        self.state = SessionState::TransportOpen;
        Ok(timeouts)
    }

    /// Tears the transport down. Idempotent; never fails.
    pub fn close_transport(&mut self) {
        self.transport.close();
        self.demote_if_open();
    }

    /// Reads up to `max_bytes` from the target under an optional deadline.
    pub fn read_transport(
        &mut self,
        max_bytes: usize,
        timeout: Option<Duration>,
    ) -> Result<Vec<u8>> {
        let result = self.transport.read(max_bytes, timeout);
        if let Err(TransportError::Closed) = &result {
            self.demote_if_open();
        }
        Ok(result?)
    }

    /// Writes all of `data` to the target under an optional deadline.
    pub fn write_transport(&mut self, data: &[u8], timeout: Option<Duration>) -> Result<()> {
        let result = self.transport.write(data, timeout);
        if let Err(TransportError::Closed) = &result {
            self.demote_if_open();
        }
        Ok(result?)
    }

    fn ensure(&self, operation: &'static str, allowed: &[SessionState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(SessionError::IllegalTransition {
                operation,
                state: self.state,
            })
        }
    }

    /// The transport saw its peer go away; the session falls back to built.
    fn demote_if_open(&mut self) {
        if self.state == SessionState::TransportOpen {
            self.state = SessionState::Built;
        }
    }
}
