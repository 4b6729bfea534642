//! Payload substitution error taxonomy.

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum PayloadError {
    #[error("step is not injectable")]
    NotInjectable,

    #[error("url rewrite failed: {0}")]
    UrlRewrite(String),

    #[error("payload set '{0}' has no payloads")]
    EmptyPayloadSet(String),
}

impl From<vulcn_driver::DriverError> for PayloadError {
    fn from(err: vulcn_driver::DriverError) -> Self {
        PayloadError::UrlRewrite(err.to_string())
    }
}
