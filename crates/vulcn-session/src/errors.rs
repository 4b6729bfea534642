//! Session Runner error taxonomy (spec.md §4.4, §7).

use thiserror::Error;
use vulcn_driver::DriverError;
use vulcn_payload::PayloadError;
use vulcn_plugin::PluginError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("payload substitution error: {0}")]
    Payload(#[from] PayloadError),

    #[error("plugin error: {0}")]
    Plugin(#[from] PluginError),
}

impl SessionError {
    /// True when this error should abort the session outright rather than
    /// be recorded and skipped (spec §7: navigation/selector failures on a
    /// non-injectable step, or during Loading, are session-fatal; the same
    /// failures during payload iteration are recovered per-payload).
    pub fn is_session_fatal(&self) -> bool {
        match self {
            SessionError::Driver(e) => e.is_session_fatal(),
            SessionError::Payload(_) => true,
            SessionError::Plugin(e) => e.is_fatal(),
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;
