//! Payload substitution (spec.md §4.2, component C2) and built-in payload
//! sets for the categories Vulcn ships out of the box.

pub mod builtins;
pub mod error;
pub mod loader;
pub mod selector;
pub mod substitution;

pub use error::PayloadError;
pub use selector::resolve_field_selector;
pub use substitution::{substitute, Substituted};
