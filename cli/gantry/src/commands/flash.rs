//! `gantry flash`: validate flash options.
//!
//! The simulator boots the firmware itself when the transport opens, so
//! there is nothing to program. The subcommand still resolves options and
//! enforces the lifecycle, matching targets where flashing is real work.

use std::collections::HashMap;

use anyhow::Result;
use gantry_options::OptionValue;
use gantry_session::Session;

pub fn run(session: &mut Session, supplied: &HashMap<String, OptionValue>) -> Result<()> {
    session.flash(supplied)?;
    println!("nothing to flash; the simulator boots the firmware at transport open");
    Ok(())
}
