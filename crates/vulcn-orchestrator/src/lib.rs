//! Scan Orchestrator (component C5, spec.md §4.5): owns the single shared
//! `Driver` and `PluginHost` for a scan, runs sessions sequentially against
//! them, and builds the fingerprint-deduplicated `ScanResult` aggregate.

pub mod error;
pub mod orchestrator;

pub use error::{OrchestratorError, OrchestratorResult};
pub use orchestrator::ScanOrchestrator;
