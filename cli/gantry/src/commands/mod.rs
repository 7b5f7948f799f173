//! One module per subcommand.

pub mod build;
pub mod flash;
pub mod generate;
pub mod info;
pub mod probe;
