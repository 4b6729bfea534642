//! `PluginManifest` (spec.md §3, §6): the stable shape every plugin exports.
//!
//! Grounded on `l7-plugin/src/manifest.rs`'s `PluginManifest`/`validate()`
//! shape, adapted from the teacher's wasm-entry/permissions fields to the
//! spec's `{ name, version, api_version, config_schema, hooks }` surface.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ManifestError, PluginResult};

/// The hook names a plugin may implement. Unknown hook names present in a
/// manifest's `hooks` list are ignored by the host (spec.md §6), so this is
/// informational metadata, not an enforced capability set.
pub const KNOWN_HOOKS: &[&str] = &[
    "init",
    "destroy",
    "scan_start",
    "scan_end",
    "run_start",
    "run_end",
    "before_payload",
    "after_payload",
    "dialog",
    "console",
    "network_response",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PluginManifest {
    pub name: String,
    pub version: String,
    /// Plugin interface version; the host speaks version 1 (spec.md §6).
    pub api_version: u32,
    #[serde(default)]
    pub config_schema: Value,
    #[serde(default)]
    pub hooks: Vec<String>,
}

impl PluginManifest {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            api_version: 1,
            config_schema: Value::Null,
            hooks: Vec::new(),
        }
    }

    pub fn with_hooks(mut self, hooks: impl IntoIterator<Item = &'static str>) -> Self {
        self.hooks = hooks.into_iter().map(str::to_string).collect();
        self
    }

    pub fn validate(&self) -> PluginResult<()> {
        if self.name.is_empty() {
            return Err(ManifestError::Invalid("name").into());
        }
        if self.version.is_empty() {
            return Err(ManifestError::Invalid("version").into());
        }
        if self.api_version == 0 {
            return Err(ManifestError::Invalid("api_version").into());
        }
        Ok(())
    }
}
