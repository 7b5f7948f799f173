//! Stage-scoped configuration options for the gantry target harness.
//!
//! Every lifecycle stage (project generation, build, flash, transport open)
//! accepts a caller-supplied key/value mapping. The [`OptionSchema`] declares
//! which options each stage recognizes or requires, their types and defaults,
//! and resolves a supplied mapping into one immutable [`ResolvedOptions`] view
//! per stage invocation.

pub mod defaults;
pub mod error;
pub mod schema;
pub mod spec;

pub use error::{ConfigError, Result};
pub use schema::{OptionSchema, ResolvedOptions};
pub use spec::{OptionSpec, OptionType, OptionValue, Stage};
