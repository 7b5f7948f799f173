//! Session lifecycle for the gantry target harness.
//!
//! A [`Session`] fronts one project tree and walks it through the target
//! lifecycle: generate a project instance, build the firmware, flash it (a
//! no-op for the simulator) and exchange bytes over the transport. Every
//! stage transition is checked against the session state; the transport
//! operations instead delegate unconditionally and let the stream report its
//! own condition.

pub mod error;
pub mod info;
pub mod session;
pub mod state;

pub use error::{Result, SessionError};
pub use info::SessionInfo;
pub use session::{Session, PLATFORM_NAME};
pub use state::{SessionMode, SessionState};
