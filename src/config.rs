//! `VulcnConfig` (SPEC_FULL.md §5.3): ambient scan defaults layered
//! defaults -> optional file -> `VULCN_`-prefixed environment variables,
//! the same layering the teacher's `load_config` does (file, then env
//! overrides), adapted from `soulbase-config` to the plain `config` crate
//! since the soulbase stack is dropped (see DESIGN.md).

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VulcnConfig {
    /// Headless by default; only meaningful once a real Chromium driver is
    /// compiled in (`real-chrome` feature).
    pub headless: bool,
    /// Per-step timeout, spec.md §5 "Cancellation and timeouts" default.
    pub default_deadline_ms: u64,
    /// Event settle window after a substituted step executes, spec.md §4.1.
    pub settle_window_ms: u64,
    /// Sentinel payload used for the once-per-step baseline pass, spec.md §4.4.
    pub baseline_sentinel: String,
}

impl Default for VulcnConfig {
    fn default() -> Self {
        Self {
            headless: true,
            default_deadline_ms: 30_000,
            settle_window_ms: 500,
            baseline_sentinel: "__baseline__".to_string(),
        }
    }
}

impl VulcnConfig {
    /// Layer defaults, an optional config file (TOML/YAML/JSON, by
    /// extension), then `VULCN_`-prefixed environment variables, mirroring
    /// the teacher's `load_config`'s defaults -> file -> env order.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let defaults = VulcnConfig::default();
        let mut builder = ::config::Config::builder()
            .set_default("headless", defaults.headless)?
            .set_default("default_deadline_ms", defaults.default_deadline_ms)?
            .set_default("settle_window_ms", defaults.settle_window_ms)?
            .set_default("baseline_sentinel", defaults.baseline_sentinel.clone())?;

        if let Some(path) = config_path {
            builder = builder.add_source(::config::File::from(path).required(true));
        }

        builder = builder.add_source(::config::Environment::with_prefix("VULCN"));

        let settled = builder.build().context("building layered configuration")?;
        settled.try_deserialize().context("deserializing VulcnConfig")
    }

    pub fn to_driver_config(&self) -> vulcn_driver::DriverConfig {
        vulcn_driver::DriverConfig {
            headless: self.headless,
            default_deadline_ms: self.default_deadline_ms,
            settle_window_ms: self.settle_window_ms,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_constants() {
        let config = VulcnConfig::default();
        assert_eq!(config.default_deadline_ms, 30_000);
        assert_eq!(config.baseline_sentinel, "__baseline__");
    }

    #[test]
    fn loads_defaults_with_no_file() {
        let config = VulcnConfig::load(None).unwrap();
        assert_eq!(config, VulcnConfig::default());
    }
}
