//! Three example detector plugins (SPEC_FULL.md §6) that exercise the full
//! hook lifecycle and ground the plugin interface in working code:
//! reflected-XSS (dialog + body-reflection confirmation), SQL-error
//! baseline (error-pattern + timing), and a generic reflection gate for the
//! `reflection` payload category.

mod reflected_xss;
mod reflection_gate;
mod report;
mod sql_error_baseline;

pub use reflected_xss::ReflectedXssDetector;
pub use reflection_gate::ReflectionGateDetector;
pub use report::ReportPlugin;
pub use sql_error_baseline::SqlErrorBaselineDetector;
