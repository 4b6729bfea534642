//! Plugin Host (component C3, spec.md §4.3): a manifest format, an
//! insertion-ordered registry, lifecycle hook contexts, and a dispatcher
//! that runs `init`/`scan_start`/`scan_end` as fatal calls, `run_start` as
//! session-fatal, and per-event hooks (`before_payload`/`after_payload`/
//! `dialog`/`console`/`network_response`) as logged-and-skip.
//!
//! Grounded on `l7-plugin`'s manifest/registry/runtime split.

pub mod builtins;
pub mod context;
pub mod errors;
pub mod host;
pub mod manifest;
pub mod plugin;
pub mod registry;

pub use context::{contains_dangerous_chars, DetectCtx, ObservedEvent, RunCtx, ScanCtx, BASELINE_SENTINEL};
pub use errors::{ManifestError, PluginError, PluginResult};
pub use host::{fingerprint_for, PluginHost};
pub use manifest::PluginManifest;
pub use plugin::{BeforePayloadOutcome, Plugin};
pub use registry::PluginRegistry;
