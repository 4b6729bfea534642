//! Shared data model for Vulcn: identifiers, `Step`/`Session`/`PayloadSet`,
//! and the crate-wide error type.

pub mod error;
pub mod ids;
pub mod payload;
pub mod session;
pub mod step;

pub use error::VulcnError;
pub use ids::{FindingId, PageId, PayloadId, PluginId, ScanId, SessionId, StepId};
pub use payload::{Category, PayloadSet};
pub use session::Session;
pub use step::{AssertKind, AssertSpec, Step, StepKind, WaitSpec};
