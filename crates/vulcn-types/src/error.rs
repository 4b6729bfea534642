//! Shared error type for the data model crate.

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum VulcnError {
    #[error("{message}")]
    Message { message: String },
}

impl VulcnError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}
