//! `gantry build`: compile the firmware binary.

use std::collections::HashMap;

use anyhow::Result;
use gantry_build::BUILD_TARGET;
use gantry_options::OptionValue;
use gantry_session::Session;

pub fn run(session: &mut Session, supplied: &HashMap<String, OptionValue>) -> Result<()> {
    session.build(supplied)?;
    println!("built {BUILD_TARGET}");
    Ok(())
}
