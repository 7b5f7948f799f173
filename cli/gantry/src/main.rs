//! Unified CLI for the gantry target harness.
//!
//! One binary drives the whole lifecycle: `generate` stamps out a project
//! instance from a template tree, `build` compiles the firmware, `flash`
//! validates its options (the simulator boots the binary itself), and
//! `probe` opens the byte transport for a quick exchange with the target.
//! `info` describes whichever tree `--project-dir` points at.

mod commands;
mod manifest;
mod overrides;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use gantry_session::Session;
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::manifest::Manifest;

#[derive(Parser)]
#[command(name = "gantry", version, about = "Harness for spike-simulated firmware targets")]
struct Cli {
    /// Project tree to operate on (template or generated instance)
    #[arg(long, global = true, default_value = ".")]
    project_dir: PathBuf,

    /// Stage option as KEY=VALUE (may be repeated)
    #[arg(short = 'o', long = "option", global = true, value_name = "KEY=VALUE")]
    options: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Describe the project tree: platform, mode, state, option table
    Info {
        /// Emit machine-readable JSON instead of the table
        #[arg(long)]
        json: bool,
    },
    /// Generate a project instance from this template
    Generate {
        /// Destination directory for the new instance (must not exist)
        dest: PathBuf,

        /// Model artifact archive to embed in the instance
        #[arg(long)]
        artifact: PathBuf,

        /// C runtime source tree to vendor into the instance
        #[arg(long)]
        crt: PathBuf,
    },
    /// Build the firmware binary
    Build,
    /// Flash the built firmware (a no-op for the simulator)
    Flash,
    /// Open the transport and exchange bytes with the target
    Probe {
        /// File whose bytes are written to the target first
        #[arg(long, conflicts_with = "send_text")]
        send: Option<PathBuf>,

        /// Literal text written to the target first
        #[arg(long)]
        send_text: Option<String>,

        /// Most bytes to read back in one call
        #[arg(long, default_value_t = 1024)]
        read_max: usize,

        /// Per-call stream deadline in seconds
        #[arg(long, default_value_t = 5.0)]
        timeout: f64,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let manifest = Manifest::find_and_load(&cli.project_dir)?;
    let mut session = Session::discover(&cli.project_dir);
    let supplied = overrides::merge(session.schema(), &manifest, &cli.options)?;
    debug!(
        project_dir = %cli.project_dir.display(),
        mode = ?session.mode(),
        overrides = supplied.len(),
        "dispatching command"
    );

    match cli.command {
        Commands::Info { json } => commands::info::run(&session, json),
        Commands::Generate { dest, artifact, crt } => {
            commands::generate::run(&mut session, &artifact, &crt, &dest, &supplied)
        }
        Commands::Build => commands::build::run(&mut session, &supplied),
        Commands::Flash => commands::flash::run(&mut session, &supplied),
        Commands::Probe { send, send_text, read_max, timeout } => commands::probe::run(
            &mut session,
            send.as_deref(),
            send_text.as_deref(),
            read_max,
            timeout,
            &supplied,
        ),
    }
}

#[cfg(test)]
mod integration_tests {
    use std::collections::HashMap;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    use gantry_options::OptionValue;
    use gantry_session::{Session, SessionMode, SessionState};
    use tempfile::tempdir;

    use super::*;

    fn write(path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    fn write_script(path: &Path, body: &str) {
        write(path, &format!("#!/bin/sh\n{body}\n"));
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn fixture_template(dir: &Path) {
        write(&dir.join("Makefile"), "all:\n\ttrue\n");
        write(&dir.join("crt_config/crt_config.h"), "#define CRT 1\n");
        write(&dir.join("src/main.cc"), "int main() { return 0; }\n");
        write(&dir.join("src/riscv_util.h"), "#pragma once\n");
    }

    fn fixture_runtime(dir: &Path) {
        write(&dir.join("include/runtime.h"), "#pragma once\n");
        write(&dir.join("Makefile"), "crt:\n");
        write(&dir.join("src/runtime/common.c"), "int rt;\n");
    }

    fn fixture_artifact(path: &Path) {
        let payload = b"graph bytes";
        let mut builder = tar::Builder::new(fs::File::create(path).unwrap());
        let mut header = tar::Header::new_gnu();
        header.set_path("model/graph.json").unwrap();
        header.set_size(payload.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append(&header, payload.as_slice()).unwrap();
        builder.finish().unwrap();
    }

    /// Template fixtures plus a generated-and-built instance, with a stub
    /// builder so no cross toolchain is needed.
    fn built_session(root: &Path) -> (Session, std::path::PathBuf) {
        let template = root.join("template");
        let runtime = root.join("crt");
        let artifact = root.join("model.tar");
        let dest = root.join("instance");
        fixture_template(&template);
        fixture_runtime(&runtime);
        fixture_artifact(&artifact);

        let builder = root.join("fake-make");
        write_script(&builder, "mkdir -p build\ntouch build/main");

        let mut session = Session::new(&template, SessionMode::Template)
            .with_builder_program(builder.to_str().unwrap());
        let supplied = HashMap::new();
        commands::generate::run(&mut session, &artifact, &runtime, &dest, &supplied).unwrap();
        commands::build::run(&mut session, &supplied).unwrap();
        (session, dest)
    }

    fn echo_options(root: &Path) -> HashMap<String, OptionValue> {
        let sim = root.join("fake-spike");
        write_script(&sim, "exec cat");
        let mut supplied = HashMap::new();
        supplied.insert(
            "spike_exe".to_string(),
            OptionValue::from(sim.to_str().unwrap()),
        );
        supplied
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn run_dispatches_an_info_invocation() {
        let root = tempdir().unwrap();
        let template = root.path().join("template");
        fixture_template(&template);

        let cli = Cli {
            project_dir: template,
            options: vec!["arch=rv64gc".to_string()],
            command: Commands::Info { json: true },
        };
        run(cli).unwrap();
    }

    #[test]
    fn generate_build_flash_probe_workflow() {
        let root = tempdir().unwrap();
        let (mut session, dest) = built_session(root.path());

        assert!(gantry_project::layout::is_generated_tree(&dest));
        assert_eq!(session.state(), SessionState::Built);

        let supplied = HashMap::new();
        commands::flash::run(&mut session, &supplied).unwrap();

        let supplied = echo_options(root.path());
        commands::probe::run(&mut session, None, Some("ping"), 64, 5.0, &supplied).unwrap();
        assert_eq!(session.state(), SessionState::Built);
    }

    #[test]
    fn probe_sends_file_contents() {
        let root = tempdir().unwrap();
        let (mut session, _dest) = built_session(root.path());

        let payload = root.path().join("payload.bin");
        fs::write(&payload, b"from a file").unwrap();

        let supplied = echo_options(root.path());
        commands::probe::run(&mut session, Some(&payload), None, 64, 5.0, &supplied).unwrap();
        assert_eq!(session.state(), SessionState::Built);
    }

    #[test]
    fn probe_refuses_an_unbuilt_project() {
        let root = tempdir().unwrap();
        let template = root.path().join("template");
        fixture_template(&template);

        let mut session = Session::new(&template, SessionMode::Template);
        let supplied = HashMap::new();
        let err = commands::probe::run(&mut session, None, None, 64, 5.0, &supplied).unwrap_err();
        assert!(err.to_string().contains("gantry build"));
    }

    #[test]
    fn probe_rejects_a_nonsensical_timeout() {
        let root = tempdir().unwrap();
        let (mut session, _dest) = built_session(root.path());

        let supplied = HashMap::new();
        let err =
            commands::probe::run(&mut session, None, None, 64, f64::NAN, &supplied).unwrap_err();
        assert!(err.to_string().contains("timeout"));
        assert_eq!(session.state(), SessionState::Built);
    }

    #[test]
    fn probe_rejects_an_oversized_timeout() {
        let root = tempdir().unwrap();
        let (mut session, _dest) = built_session(root.path());

        // Finite, non-negative, and still far past what a stream deadline
        // can represent; must error instead of aborting.
        let supplied = HashMap::new();
        let err =
            commands::probe::run(&mut session, None, None, 64, 1.0e20, &supplied).unwrap_err();
        assert!(err.to_string().contains("timeout"));
        assert_eq!(session.state(), SessionState::Built);
    }

    #[test]
    fn probe_reports_a_silent_target_without_failing() {
        let root = tempdir().unwrap();
        let (mut session, _dest) = built_session(root.path());

        let sim = root.path().join("fake-spike");
        write_script(&sim, "exec sleep 30");
        let mut supplied = HashMap::new();
        supplied.insert(
            "spike_exe".to_string(),
            OptionValue::from(sim.to_str().unwrap()),
        );

        commands::probe::run(&mut session, None, None, 64, 0.2, &supplied).unwrap();
        assert_eq!(session.state(), SessionState::Built);
    }

    #[test]
    fn info_renders_in_both_formats() {
        let root = tempdir().unwrap();
        let template = root.path().join("template");
        fixture_template(&template);

        let session = Session::discover(&template);
        commands::info::run(&session, false).unwrap();
        commands::info::run(&session, true).unwrap();
    }

    #[test]
    fn manifest_options_reach_the_command() {
        let root = tempdir().unwrap();
        let template = root.path().join("template");
        fixture_template(&template);
        write(
            &template.join(manifest::MANIFEST_NAME),
            "[options]\narch = \"rv64gc\"\n",
        );

        let manifest = Manifest::find_and_load(&template).unwrap();
        let session = Session::discover(&template);
        let supplied =
            overrides::merge(session.schema(), &manifest, &["abi=lp64d".to_string()]).unwrap();
        assert_eq!(supplied.get("arch"), Some(&OptionValue::from("rv64gc")));
        assert_eq!(supplied.get("abi"), Some(&OptionValue::from("lp64d")));
    }
}
