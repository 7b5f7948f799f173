//! `gantry generate`: stamp out a project instance from a template.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use gantry_options::OptionValue;
use gantry_session::Session;

pub fn run(
    session: &mut Session,
    artifact: &Path,
    runtime_dir: &Path,
    dest: &Path,
    supplied: &HashMap<String, OptionValue>,
) -> Result<()> {
    session.generate_project(artifact, runtime_dir, dest, supplied)?;
    println!("generated project instance at {}", dest.display());
    Ok(())
}
