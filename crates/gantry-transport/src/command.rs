//! Composition of the target process invocation.

use std::path::{Path, PathBuf};

use gantry_options::{defaults, ResolvedOptions};

/// A fully composed target invocation: the simulator, the proxy kernel and
/// the firmware binary it should run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl TargetCommand {
    /// Composes `spike --isa=<arch> [extra] pk [extra] <firmware>` from the
    /// resolved open-transport options.
    ///
    /// Extra-argument options are passed through as single opaque argv
    /// entries and skipped entirely when empty. `firmware` is resolved by
    /// the target process relative to `project_dir`, which becomes its
    /// working directory.
    pub fn from_options(options: &ResolvedOptions, project_dir: &Path, firmware: &Path) -> Self {
        let program = options
            .get_str("spike_exe")
            .unwrap_or(defaults::SPIKE_EXE)
            .to_string();

        let isa = options.get_str("arch").unwrap_or(defaults::ARCH);
        let mut args = vec![format!("--isa={isa}")];
        if let Some(extra) = options.get_str("spike_extra_args") {
            if !extra.is_empty() {
                args.push(extra.to_string());
            }
        }
        args.push(
            options
                .get_str("spike_pk")
                .unwrap_or(defaults::SPIKE_PK)
                .to_string(),
        );
        if let Some(extra) = options.get_str("pk_extra_args") {
            if !extra.is_empty() {
                args.push(extra.to_string());
            }
        }
        args.push(firmware.display().to_string());

        TargetCommand {
            program,
            args,
            cwd: project_dir.to_path_buf(),
        }
    }
}
