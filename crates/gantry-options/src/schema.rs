//! Schema declaration and per-stage resolution.

use std::collections::{BTreeMap, HashMap};

use crate::defaults;
use crate::error::{ConfigError, Result};
use crate::spec::{OptionSpec, OptionType, OptionValue, Stage};

/// The full set of options a harness understands across all stages.
#[derive(Debug, Clone, Default)]
pub struct OptionSchema {
    specs: Vec<OptionSpec>,
}

impl OptionSchema {
    pub fn new(specs: Vec<OptionSpec>) -> Self {
        OptionSchema { specs }
    }

    /// The schema shipped for the spike simulator target.
    pub fn builtin() -> Self {
        OptionSchema::new(vec![
            OptionSpec::new("verbose", OptionType::Bool, "Run the build with verbose toolchain output.")
                .recognized_in(&[Stage::Build]),
            OptionSpec::new("spike_exe", OptionType::Str, "Path to the spike executable.")
                .recognized_in(&[Stage::OpenTransport])
                .with_default(defaults::SPIKE_EXE),
            OptionSpec::new("spike_pk", OptionType::Str, "Path to the proxy-kernel image.")
                .recognized_in(&[Stage::OpenTransport])
                .with_default(defaults::SPIKE_PK),
            OptionSpec::new("arch", OptionType::Str, "ISA string for the toolchain and the simulator.")
                .recognized_in(&[Stage::Build, Stage::OpenTransport])
                .with_default(defaults::ARCH),
            OptionSpec::new("abi", OptionType::Str, "ABI string for the cross toolchain.")
                .recognized_in(&[Stage::Build])
                .with_default(defaults::ABI),
            OptionSpec::new("triple", OptionType::Str, "Target triple for the cross toolchain.")
                .recognized_in(&[Stage::Build])
                .with_default(defaults::TRIPLE),
            OptionSpec::new("spike_extra_args", OptionType::Str, "Extra arguments passed to spike.")
                .recognized_in(&[Stage::OpenTransport]),
            OptionSpec::new("pk_extra_args", OptionType::Str, "Extra arguments passed to the proxy kernel.")
                .recognized_in(&[Stage::OpenTransport]),
        ])
    }

    pub fn specs(&self) -> &[OptionSpec] {
        &self.specs
    }

    pub fn find(&self, name: &str) -> Option<&OptionSpec> {
        self.specs.iter().find(|spec| spec.name == name)
    }

    /// Resolves a caller-supplied mapping for one stage.
    ///
    /// Supplied values win over declared defaults. Options the schema does not
    /// declare at all are rejected; options declared only for other stages are
    /// ignored, so callers may pass one mapping across every stage. A required
    /// option with neither a value nor a default fails the whole resolution.
    pub fn resolve(
        &self,
        stage: Stage,
        supplied: &HashMap<String, OptionValue>,
    ) -> Result<ResolvedOptions> {
        let mut unknown: Vec<&str> = supplied
            .keys()
            .filter(|name| self.find(name).is_none())
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            unknown.sort_unstable();
            return Err(ConfigError::Unknown {
                name: unknown[0].to_string(),
            });
        }

        let mut values = BTreeMap::new();
        for spec in &self.specs {
            if !spec.is_recognized_in(stage) {
                continue;
            }
            match supplied.get(&spec.name) {
                Some(value) => {
                    if value.type_of() != spec.value_type {
                        return Err(ConfigError::WrongType {
                            name: spec.name.clone(),
                            expected: spec.value_type,
                        });
                    }
                    values.insert(spec.name.clone(), value.clone());
                }
                None => match &spec.default {
                    Some(default) => {
                        values.insert(spec.name.clone(), default.clone());
                    }
                    None if spec.is_required_in(stage) => {
                        return Err(ConfigError::Missing {
                            name: spec.name.clone(),
                            stage,
                        });
                    }
                    None => {}
                },
            }
        }
        Ok(ResolvedOptions { values })
    }
}

/// Immutable option view handed to one stage invocation.
#[derive(Debug, Clone, Default)]
pub struct ResolvedOptions {
    values: BTreeMap<String, OptionValue>,
}

impl ResolvedOptions {
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.values.get(name).and_then(OptionValue::as_bool)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(OptionValue::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supplied(pairs: &[(&str, OptionValue)]) -> HashMap<String, OptionValue> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn builtin_defaults_fill_open_transport() {
        let schema = OptionSchema::builtin();
        let resolved = schema.resolve(Stage::OpenTransport, &HashMap::new()).unwrap();
        assert_eq!(resolved.get_str("spike_exe"), Some("spike"));
        assert_eq!(resolved.get_str("spike_pk"), Some("pk"));
        assert_eq!(resolved.get_str("arch"), Some("rv32gc"));
        assert_eq!(resolved.get_str("abi"), None);
        assert_eq!(resolved.get_str("spike_extra_args"), None);
    }

    #[test]
    fn supplied_value_wins_over_default() {
        let schema = OptionSchema::builtin();
        let resolved = schema
            .resolve(Stage::Build, &supplied(&[("arch", OptionValue::from("rv64gc"))]))
            .unwrap();
        assert_eq!(resolved.get_str("arch"), Some("rv64gc"));
        assert_eq!(resolved.get_str("abi"), Some("ilp32d"));
    }

    #[test]
    fn wrong_value_type_is_rejected() {
        let schema = OptionSchema::builtin();
        let err = schema
            .resolve(Stage::Build, &supplied(&[("verbose", OptionValue::from("yes"))]))
            .unwrap_err();
        match err {
            ConfigError::WrongType { name, expected } => {
                assert_eq!(name, "verbose");
                assert_eq!(expected, OptionType::Bool);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn option_for_another_stage_is_ignored() {
        let schema = OptionSchema::builtin();
        let resolved = schema
            .resolve(Stage::Build, &supplied(&[("spike_exe", OptionValue::from("/opt/spike"))]))
            .unwrap();
        assert_eq!(resolved.get_str("spike_exe"), None);
    }

    #[test]
    fn undeclared_option_is_rejected() {
        let schema = OptionSchema::builtin();
        let err = schema
            .resolve(Stage::Build, &supplied(&[("verbos", OptionValue::from(true))]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Unknown { name } if name == "verbos"));
    }

    #[test]
    fn required_without_value_or_default_fails() {
        let schema = OptionSchema::new(vec![
            OptionSpec::new("device", OptionType::Str, "target device node")
                .required_in(&[Stage::Flash]),
            OptionSpec::new("port", OptionType::Str, "serial port")
                .recognized_in(&[Stage::Flash])
                .with_default("ttyUSB0"),
        ]);
        let err = schema.resolve(Stage::Flash, &HashMap::new()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Missing { name, stage: Stage::Flash } if name == "device"
        ));
    }

    #[test]
    fn required_option_accepts_supplied_value() {
        let schema = OptionSchema::new(vec![OptionSpec::new(
            "device",
            OptionType::Str,
            "target device node",
        )
        .required_in(&[Stage::Flash])]);
        let resolved = schema
            .resolve(Stage::Flash, &supplied(&[("device", OptionValue::from("/dev/ttyACM0"))]))
            .unwrap();
        assert_eq!(resolved.get_str("device"), Some("/dev/ttyACM0"));
    }

    #[test]
    fn required_option_with_default_resolves_from_default() {
        let schema = OptionSchema::new(vec![OptionSpec::new(
            "device",
            OptionType::Str,
            "target device node",
        )
        .required_in(&[Stage::Flash])
        .with_default("/dev/ttyACM0")]);
        let resolved = schema.resolve(Stage::Flash, &HashMap::new()).unwrap();
        assert_eq!(resolved.get_str("device"), Some("/dev/ttyACM0"));
    }

    #[test]
    fn stage_with_no_recognized_options_resolves_empty() {
        let schema = OptionSchema::builtin();
        let resolved = schema.resolve(Stage::Flash, &HashMap::new()).unwrap();
        assert!(resolved.is_empty());
    }

    #[test]
    fn one_mapping_serves_every_stage() {
        let schema = OptionSchema::builtin();
        let everything = supplied(&[
            ("verbose", OptionValue::from(true)),
            ("spike_exe", OptionValue::from("/opt/riscv/bin/spike")),
            ("arch", OptionValue::from("rv64gc")),
        ]);
        let build = schema.resolve(Stage::Build, &everything).unwrap();
        let transport = schema.resolve(Stage::OpenTransport, &everything).unwrap();
        assert_eq!(build.get_bool("verbose"), Some(true));
        assert_eq!(build.get_str("spike_exe"), None);
        assert_eq!(transport.get_str("spike_exe"), Some("/opt/riscv/bin/spike"));
        assert_eq!(transport.get_bool("verbose"), None);
        assert_eq!(transport.get_str("arch"), Some("rv64gc"));
    }
}
