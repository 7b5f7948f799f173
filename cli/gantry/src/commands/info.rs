//! `gantry info`: describe the project tree and its option table.

use anyhow::Result;
use gantry_session::Session;

pub fn run(session: &Session, json: bool) -> Result<()> {
    let info = session.info();
    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("platform: {}", info.platform_name);
    println!("version:  {}", info.version);
    println!("mode:     {}", info.mode);
    println!("state:    {}", info.state);
    if let Some(artifact) = &info.artifact {
        println!("artifact: {}", artifact.display());
    }
    println!();
    println!("options:");
    for spec in &info.options {
        let stages = spec
            .recognized
            .iter()
            .map(|stage| stage.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let mut line = format!("  {:<18} {:<8} [{stages}]", spec.name, spec.value_type);
        if let Some(default) = &spec.default {
            line.push_str(&format!(" (default: {default})"));
        }
        println!("{line}");
        println!("      {}", spec.help);
    }
    Ok(())
}
