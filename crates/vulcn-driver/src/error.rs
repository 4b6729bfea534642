//! Driver error taxonomy (spec.md §7).

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum DriverError {
    #[error("navigation timed out after {0}ms")]
    NavigationTimeout(u64),

    #[error("selector not found: {0}")]
    SelectorNotFound(String),

    #[error("target unreachable: {0}")]
    Unreachable(String),

    #[error("driver is closed")]
    Closed,

    #[error("internal driver error: {0}")]
    Internal(String),
}

impl DriverError {
    /// Non-injectable steps that fail this way abort the session (spec §4.4);
    /// the same errors during payload iteration are recorded and skipped.
    pub fn is_session_fatal(&self) -> bool {
        matches!(
            self,
            DriverError::NavigationTimeout(_)
                | DriverError::SelectorNotFound(_)
                | DriverError::Unreachable(_)
                | DriverError::Closed
        )
    }
}
