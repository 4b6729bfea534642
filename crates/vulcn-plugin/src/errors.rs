//! Plugin error taxonomy (spec.md §4.3, §7): lifecycle failures
//! (`init`/`scan_start`/`scan_end`) are fatal to the scan; per-event
//! handler failures (`dialog`/`console`/`network_response`/`after_payload`)
//! are logged and skipped, and the offending plugin is not disabled.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("missing field: {0}")]
    Missing(&'static str),
    #[error("invalid field: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("plugin not found: {0}")]
    NotFound(String),
    #[error("duplicate plugin name: {0}")]
    Duplicate(String),
    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),
    #[error("hook failed: {0}")]
    Hook(String),
}

impl PluginError {
    /// Lifecycle failures (`init`, `scan_start`, `scan_end`) are fatal and
    /// abort the scan with the plugin's error surfaced verbatim (spec §7).
    /// Manifest/registration errors are also fatal — a plugin that fails to
    /// validate can never safely run any hook. Per-event hook failures are
    /// constructed directly as `PluginError::Hook` by the host and are
    /// never fatal; the host logs and skips them instead of propagating.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, PluginError::Hook(_))
    }
}

pub type PluginResult<T> = Result<T, PluginError>;
