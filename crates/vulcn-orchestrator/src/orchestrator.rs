//! `ScanOrchestrator` (component C5, spec.md §4.5): owns one shared
//! `Driver` and `PluginHost` for the whole scan, runs sessions
//! sequentially, and builds the fingerprint-deduped aggregate.
//!
//! Grounded on `scheduler/src/orchestrator.rs`'s `Orchestrator<R, E>` shape
//! (own the shared collaborators, drive work through them, never hold
//! cross-call state outside those collaborators) and
//! `soulbrowser-kernel/src/runtime.rs`'s `RuntimeHandle` `Drop`-based
//! cleanup guarantee, adapted from its single long-lived runtime handle to
//! a guard that survives exactly one scan call.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};
use vulcn_driver::Driver;
use vulcn_findings::ScanResult;
use vulcn_plugin::{PluginHost, ScanCtx};
use vulcn_session::SessionRunner;
use vulcn_types::{PayloadSet, ScanId, Session};

use crate::error::{OrchestratorError, OrchestratorResult};

/// Closes the shared Driver when dropped, so a panic unwinding out of
/// `ScanOrchestrator::run` still releases the browser (spec §4.5: "Close
/// the Driver, guaranteed on every exit path, including panics"). The
/// normal path also closes explicitly for deterministic logging;
/// `Driver::close` is documented safe to call more than once.
struct DriverCloseGuard {
    driver: Arc<dyn Driver>,
}

impl Drop for DriverCloseGuard {
    fn drop(&mut self) {
        let driver = Arc::clone(&self.driver);
        tokio::spawn(async move {
            if let Err(e) = driver.close().await {
                warn!(error = %e, "driver close failed during cleanup");
            }
        });
    }
}

pub struct ScanOrchestrator {
    driver: Arc<dyn Driver>,
    plugins: Arc<PluginHost>,
    on_session_start: Option<Arc<dyn Fn(usize, usize) + Send + Sync>>,
}

impl ScanOrchestrator {
    pub fn new(driver: Arc<dyn Driver>, plugins: Arc<PluginHost>) -> Self {
        Self {
            driver,
            plugins,
            on_session_start: None,
        }
    }

    /// Registers a progress callback invoked as `f(i, n)` just before session
    /// `i` of `n` starts (spec §4.5 step 3). Optional: a scan with none
    /// registered behaves exactly as before, logging progress via `tracing`.
    pub fn with_session_progress(mut self, f: impl Fn(usize, usize) + Send + Sync + 'static) -> Self {
        self.on_session_start = Some(Arc::new(f));
        self
    }

    /// Run every session in `sessions` sequentially against the shared
    /// Driver, substituting `payload_sets` into each session's focus step,
    /// and return the deduplicated aggregate (spec §4.5 steps 1-6).
    #[instrument(skip(self, sessions, payload_sets), fields(session_count = sessions.len()))]
    pub async fn run(&self, sessions: &[Session], payload_sets: &[PayloadSet]) -> OrchestratorResult<ScanResult> {
        let _close_guard = DriverCloseGuard {
            driver: Arc::clone(&self.driver),
        };

        let scan_id = ScanId::new();
        let started_at = Utc::now();
        let scan_ctx = ScanCtx {
            scan_id: scan_id.clone(),
            session_names: sessions.iter().map(|s| s.name.clone()).collect(),
            session_count: sessions.len(),
        };

        self.plugins.init_all().await.map_err(OrchestratorError::Plugin)?;
        let result = self.run_sessions(&scan_id, started_at, sessions, payload_sets, &scan_ctx).await;
        self.plugins.destroy_all().await;

        if let Err(e) = self.driver.close().await {
            warn!(error = %e, "driver close failed");
        }

        result
    }

    async fn run_sessions(
        &self,
        scan_id: &ScanId,
        started_at: chrono::DateTime<Utc>,
        sessions: &[Session],
        payload_sets: &[PayloadSet],
        scan_ctx: &ScanCtx,
    ) -> OrchestratorResult<ScanResult> {
        self.plugins.scan_start(scan_ctx).await.map_err(OrchestratorError::Plugin)?;

        let scan_mode = sessions.len() > 1;
        let runner = SessionRunner::new(Arc::clone(&self.driver), Arc::clone(&self.plugins));
        let mut run_results = Vec::with_capacity(sessions.len());

        for (index, session) in sessions.iter().enumerate() {
            if let Some(cb) = &self.on_session_start {
                cb(index, sessions.len());
            }
            info!(index, total = sessions.len(), session = %session.name, "starting session");
            let run_result = runner.run(scan_id.clone(), session, payload_sets, scan_mode).await;
            run_results.push(run_result);
        }

        let aggregate = ScanResult::aggregate(scan_id.clone(), started_at, run_results);
        let aggregate = self.plugins.scan_end(aggregate, scan_ctx).await.map_err(OrchestratorError::Plugin)?;
        Ok(aggregate)
    }
}
