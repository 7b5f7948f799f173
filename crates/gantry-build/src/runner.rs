//! Composes and runs the firmware build invocation.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

use gantry_options::{defaults, ResolvedOptions};
use tracing::{debug, info};

use crate::error::{BuildError, Result};

/// Make target producing the firmware binary, relative to the project tree.
pub const BUILD_TARGET: &str = "build/main";

/// Runs the project build.
///
/// Stateless: every call composes the full invocation from the project tree
/// and the resolved options. The builder program defaults to `make` and can
/// be substituted for systems where GNU make goes by another name.
#[derive(Debug, Clone)]
pub struct BuildRunner {
    project_dir: PathBuf,
    program: String,
}

impl BuildRunner {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        BuildRunner {
            project_dir: project_dir.into(),
            program: "make".to_string(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// The argv composed for one build, without the program name.
    ///
    /// Order is fixed: parallelism, optional verbosity, the toolchain
    /// variables, then the target.
    pub fn compose_args(&self, options: &ResolvedOptions) -> Vec<String> {
        let jobs = thread::available_parallelism().map_or(1, usize::from);
        let mut args = vec![format!("-j{jobs}")];
        if options.get_bool("verbose").unwrap_or(false) {
            args.push("VERBOSE=1".to_string());
        }
        args.push(format!("ARCH={}", options.get_str("arch").unwrap_or(defaults::ARCH)));
        args.push(format!("ABI={}", options.get_str("abi").unwrap_or(defaults::ABI)));
        args.push(format!(
            "TRIPLE={}",
            options.get_str("triple").unwrap_or(defaults::TRIPLE)
        ));
        args.push(BUILD_TARGET.to_string());
        args
    }

    /// Runs the build to completion. The builder's output is surfaced only
    /// when the `verbose` option is set.
    pub fn build(&self, options: &ResolvedOptions) -> Result<()> {
        let args = self.compose_args(options);
        debug!(program = %self.program, ?args, "invoking builder");

        let mut command = Command::new(&self.program);
        command.args(&args).current_dir(&self.project_dir);
        if !options.get_bool("verbose").unwrap_or(false) {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }

        let status = command.status().map_err(|e| BuildError::Spawn {
            program: self.program.clone(),
            source: e,
        })?;
        if !status.success() {
            return Err(BuildError::Failed { status });
        }
        info!(target = BUILD_TARGET, "build finished");
        Ok(())
    }
}
