//! Build orchestration for the gantry target harness.
//!
//! Drives the project's `make`-based build: one parallel invocation of the
//! fixed firmware target, with the ISA, ABI and toolchain triple passed as
//! make variables. The runner holds no state between invocations.

pub mod error;
pub mod runner;

pub use error::{BuildError, Result};
pub use runner::{BuildRunner, BUILD_TARGET};
