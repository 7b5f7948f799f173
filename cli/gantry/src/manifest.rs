//! The `gantry.toml` manifest: persistent stage options for a project tree.
//!
//! A manifest is optional. When present it seeds the option mapping for
//! every command; `-o KEY=VALUE` flags override individual entries.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use gantry_options::OptionValue;
use serde::Deserialize;

pub const MANIFEST_NAME: &str = "gantry.toml";

#[derive(Debug, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub options: HashMap<String, OptionValue>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
    }

    /// Parse a manifest from a TOML string.
    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing manifest")
    }

    /// Looks for a manifest in `start` or any of its ancestors. A missing
    /// manifest is not an error; commands then run on flags alone.
    pub fn find_and_load(start: &Path) -> Result<Self> {
        for dir in start.ancestors() {
            let candidate = dir.join(MANIFEST_NAME);
            if candidate.is_file() {
                return Self::load(&candidate);
            }
        }
        Ok(Manifest::default())
    }
}
