//! Option declarations: stages, value types, and per-option metadata.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A lifecycle stage that consumes configuration options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    GenerateProject,
    Build,
    Flash,
    OpenTransport,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::GenerateProject => "generate-project",
            Stage::Build => "build",
            Stage::Flash => "flash",
            Stage::OpenTransport => "open-transport",
        };
        write!(f, "{name}")
    }
}

/// The type an option value must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Bool,
    Str,
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Bool => write!(f, "bool"),
            OptionType::Str => write!(f, "string"),
        }
    }
}

/// A typed option value supplied by a caller or taken from a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Str(String),
}

impl OptionValue {
    pub fn type_of(&self) -> OptionType {
        match self {
            OptionValue::Bool(_) => OptionType::Bool,
            OptionValue::Str(_) => OptionType::Str,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            OptionValue::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) => Some(s),
            OptionValue::Bool(_) => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{b}"),
            OptionValue::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Str(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Str(s)
    }
}

/// Declaration of a single configuration option.
///
/// An option is visible only to the stages listed in `recognized`. Marking a
/// stage as required also marks it recognized, so a required-but-unknown
/// combination cannot be expressed.
#[derive(Debug, Clone, Serialize)]
pub struct OptionSpec {
    pub name: String,
    pub value_type: OptionType,
    pub recognized: Vec<Stage>,
    pub required: Vec<Stage>,
    pub default: Option<OptionValue>,
    pub help: String,
}

impl OptionSpec {
    pub fn new(name: impl Into<String>, value_type: OptionType, help: impl Into<String>) -> Self {
        OptionSpec {
            name: name.into(),
            value_type,
            recognized: Vec::new(),
            required: Vec::new(),
            default: None,
            help: help.into(),
        }
    }

    /// Declares the stages this option may be supplied to.
    pub fn recognized_in(mut self, stages: &[Stage]) -> Self {
        for stage in stages {
            if !self.recognized.contains(stage) {
                self.recognized.push(*stage);
            }
        }
        self
    }

    /// Declares the stages this option must have a value for. Required stages
    /// are recognized stages as well.
    pub fn required_in(mut self, stages: &[Stage]) -> Self {
        for stage in stages {
            if !self.required.contains(stage) {
                self.required.push(*stage);
            }
        }
        self.recognized_in(stages)
    }

    pub fn with_default(mut self, default: impl Into<OptionValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn is_recognized_in(&self, stage: Stage) -> bool {
        self.recognized.contains(&stage)
    }

    pub fn is_required_in(&self, stage: Stage) -> bool {
        self.required.contains(&stage)
    }
}
