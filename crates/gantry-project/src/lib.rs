//! Project tree generation for the gantry target harness.
//!
//! A harness serves either a pristine template tree or a generated project
//! instance. Generation materializes an instance from a template: the model
//! artifact archive is copied in and safely extracted, the C runtime sources
//! are vendored, and the template's build files are laid down in a fixed
//! order. The presence of the artifact archive at the tree root is what
//! distinguishes an instance from a template.

pub mod archive;
pub mod error;
pub mod generate;
pub mod layout;

pub use error::{GenerateError, Result};
pub use generate::ProjectGenerator;
