//! Vulcn library surface: re-exports the component crates and the ambient
//! config/error/CLI wiring used by `src/main.rs`.

pub mod cli;
pub mod config;
pub mod errors;

pub use config::VulcnConfig;
pub use errors::{exit_code, VulcnCliError};

pub use vulcn_driver as driver;
pub use vulcn_event_bus as event_bus;
pub use vulcn_findings as findings;
pub use vulcn_orchestrator as orchestrator;
pub use vulcn_payload as payload;
pub use vulcn_plugin as plugin;
pub use vulcn_session as session;
pub use vulcn_types as types;
