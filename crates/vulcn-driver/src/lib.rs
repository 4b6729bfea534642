//! Browser driver abstraction for Vulcn (spec.md §4.1, component C1).
//!
//! `Driver` owns one browser instance for the lifetime of a scan. Two
//! implementations exist: [`stub::StubDriver`], used by every test and the
//! CLI demo, and [`chromium::ChromiumDriver`] (behind the `real-chrome`
//! feature), which drives an actual Chromium process via `chromiumoxide`.

pub mod config;
pub mod driver;
pub mod error;
pub mod stub;
pub mod url_injection;

#[cfg(feature = "real-chrome")]
pub mod chromium;

use std::sync::Arc;

pub use config::{BrowserKind, DriverConfig};
pub use driver::{Driver, PageHandle, StepOutcome};
pub use error::DriverError;
pub use stub::{ClosureBackend, ReflectingBackend, ScriptedBackend, StubBackend, StubDriver, StubResponse};

/// Launch a driver per `config`. Mirrors the teacher's real-vs-stub chrome
/// detection in `CdpAdapter::new()`: the real backend only activates when
/// the `real-chrome` feature is compiled in and `VULCN_USE_REAL_CHROME=1` is
/// set in the environment, so test and CI runs default to `StubDriver`
/// without any code change.
pub async fn launch(config: DriverConfig) -> Result<Arc<dyn Driver>, DriverError> {
    #[cfg(feature = "real-chrome")]
    {
        if std::env::var("VULCN_USE_REAL_CHROME").as_deref() == Ok("1") {
            let driver = chromium::ChromiumDriver::launch(config).await?;
            return Ok(Arc::new(driver));
        }
    }
    let _ = &config;
    Ok(StubDriver::reflecting())
}
