//! Scan Orchestrator error taxonomy (spec.md §4.5, §7).

use thiserror::Error;
use vulcn_driver::DriverError;
use vulcn_plugin::PluginError;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("driver launch failed: {0}")]
    Launch(#[from] DriverError),

    #[error("plugin lifecycle error: {0}")]
    Plugin(#[from] PluginError),
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
