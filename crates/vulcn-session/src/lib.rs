//! Session Runner (component C4, spec.md §4.4): drives one `Session`
//! against a shared `Driver`, substituting payloads into the session's
//! (at most one) injectable focus step and fusing detector findings
//! through a `PluginHost`.

pub mod errors;
pub mod runner;

pub use errors::{SessionError, SessionResult};
pub use runner::SessionRunner;
