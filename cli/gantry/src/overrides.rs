//! Merging manifest options with `-o KEY=VALUE` command-line overrides.

use std::collections::HashMap;

use anyhow::{bail, Result};
use gantry_options::{OptionSchema, OptionType, OptionValue};

use crate::manifest::Manifest;

/// Builds the supplied-option mapping for one command invocation. Manifest
/// entries come first, then each `KEY=VALUE` pair on top. Pairs are parsed
/// against the schema so a typo fails here instead of mid-stage.
pub fn merge(
    schema: &OptionSchema,
    manifest: &Manifest,
    pairs: &[String],
) -> Result<HashMap<String, OptionValue>> {
    let mut supplied = manifest.options.clone();
    for pair in pairs {
        let Some((key, raw)) = pair.split_once('=') else {
            bail!("malformed option `{pair}`; expected KEY=VALUE");
        };
        let Some(spec) = schema.find(key) else {
            bail!("unknown option `{key}`");
        };
        let value = match spec.value_type {
            OptionType::Bool => match raw {
                "true" | "1" => OptionValue::Bool(true),
                "false" | "0" => OptionValue::Bool(false),
                other => bail!("option `{key}` expects true or false, got `{other}`"),
            },
            OptionType::Str => OptionValue::from(raw),
        };
        supplied.insert(key.to_string(), value);
    }
    Ok(supplied)
}
