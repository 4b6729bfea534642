//! `SessionRunner` (component C4, spec.md §4.4): the
//! Loading -> Executing -> Finalizing -> Closed state machine that drives
//! one `Session` against one `Driver`-owned page, substituting payloads at
//! the session's (at most one) injectable focus step and fusing detector
//! findings through the `PluginHost`.
//!
//! Grounded on `action-flow/src/executor.rs`'s phase-by-phase executor
//! shape (acquire resource -> iterate steps -> always finalize -> release
//! resource), adapted from its action-primitive dispatch to the spec's
//! substitute/detect/dedup payload loop.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};
use vulcn_driver::{Driver, PageHandle};
use vulcn_event_bus::PageEvent;
use vulcn_findings::{BaselineCache, Dedup, DetectionMethod, RunResult, StepBaseline};
use vulcn_payload::{substitute, Substituted};
use vulcn_plugin::{BeforePayloadOutcome, DetectCtx, PluginHost, RunCtx, BASELINE_SENTINEL};
use vulcn_types::{PayloadSet, ScanId, Session, Step};

use crate::errors::SessionError;

/// Phases of the per-session state machine (spec.md §4.4). Carried purely
/// for structured logging; control flow itself is a straight-line function
/// with a single finalize path, matching the diagram's guarantee that
/// Finalizing is always reached once Executing is entered.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum SessionState {
    Loading,
    Executing,
    Finalizing,
    Closed,
}

pub struct SessionRunner {
    driver: Arc<dyn Driver>,
    plugins: Arc<PluginHost>,
}

impl SessionRunner {
    pub fn new(driver: Arc<dyn Driver>, plugins: Arc<PluginHost>) -> Self {
        Self { driver, plugins }
    }

    /// Run `session` to completion, substituting `payload_sets` into its
    /// focus step. `scan_mode` is forwarded to plugins via `RunCtx` (spec
    /// §4.3 scan-vs-run semantics).
    #[instrument(skip(self, session, payload_sets), fields(session_id = %session.id, session_name = %session.name))]
    pub async fn run(&self, scan_id: ScanId, session: &Session, payload_sets: &[PayloadSet], scan_mode: bool) -> RunResult {
        let mut state = SessionState::Loading;
        let mut result = RunResult::new(session.id.clone(), session.name.clone());
        let run_ctx = RunCtx {
            scan_id: scan_id.clone(),
            session_id: session.id.clone(),
            session_name: session.name.clone(),
            scan_mode,
        };

        debug!(?state, "entering Loading");
        let page = match self.driver.new_session_context().await {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %e, "session loading failed");
                result.success = false;
                result.errors.push(format!("loading: {e}"));
                return result.finish();
            }
        };

        if let Err(e) = self.plugins.run_start(&run_ctx).await {
            warn!(error = %e, "run_start failed, aborting session");
            result.success = false;
            result.errors.push(format!("run_start: {e}"));
            let _ = self.driver.close_session_context(page).await;
            return result.finish();
        }

        state = SessionState::Executing;
        debug!(?state, "entering Executing");
        let dedup = Dedup::new();
        let baseline = self.execute_steps(&page, session, payload_sets, &run_ctx, &dedup, &mut result).await;
        let _ = baseline;

        state = SessionState::Finalizing;
        debug!(?state, "entering Finalizing");
        result = self.plugins.run_end(result, &run_ctx).await;

        state = SessionState::Closed;
        debug!(?state, "entering Closed");
        if let Err(e) = self.driver.close_session_context(page).await {
            warn!(error = %e, "failed to close page context");
            result.errors.push(format!("close: {e}"));
        }

        info!(
            findings = result.findings.len(),
            steps_executed = result.steps_executed,
            payloads_tested = result.payloads_tested,
            "session finished",
        );
        result.finish()
    }

    /// Walks `session.steps` in order, executing non-focus steps once and
    /// running the baseline + per-payload loop on the (at most one)
    /// injectable focus step (spec.md §3, §4.4).
    async fn execute_steps(
        &self,
        page: &PageHandle,
        session: &Session,
        payload_sets: &[PayloadSet],
        run_ctx: &RunCtx,
        dedup: &Dedup,
        result: &mut RunResult,
    ) -> BaselineCache {
        let mut baseline = BaselineCache::new();

        for step in &session.steps {
            if !step.is_injectable() {
                self.execute_plain_step(page, step, result).await;
                continue;
            }

            if let Err(e) = self.run_focus_step(page, step, payload_sets, run_ctx, dedup, &mut baseline, result).await {
                warn!(step_id = %step.id, error = %e, "focus step failed");
                result.errors.push(format!("step {}: {e}", step.id));
                if e.is_session_fatal() {
                    result.success = false;
                    break;
                }
            }
        }

        baseline
    }

    /// Execute a non-injectable step once. A dialog firing here is
    /// unexpected (spec §4.4): auto-dismissed by the driver, logged as
    /// benign, never dispatched to plugins.
    async fn execute_plain_step(&self, page: &PageHandle, step: &Step, result: &mut RunResult) {
        let mut events = self.driver.subscribe_events(page);
        match self.driver.execute_step(page, step).await {
            Ok(outcome) => {
                result.steps_executed += 1;
                for event in drain_available(&mut events) {
                    if matches!(event, PageEvent::Dialog(_)) {
                        debug!(step_id = %step.id, "benign dialog during non-injectable step");
                    }
                }
                if !outcome.ok {
                    if let Some(err) = outcome.error {
                        warn!(step_id = %step.id, error = %err, "non-injectable step reported failure");
                        result.errors.push(format!("step {}: {err}", step.id));
                        if err.is_session_fatal() {
                            result.success = false;
                        }
                    }
                }
            }
            Err(e) => {
                warn!(step_id = %step.id, error = %e, "non-injectable step aborted session");
                result.errors.push(format!("step {}: {e}", step.id));
                result.success = false;
            }
        }
    }

    /// Baseline pass (once) followed by the per-payload loop on the focus
    /// step (spec §4.4 steps 1-2).
    async fn run_focus_step(
        &self,
        page: &PageHandle,
        focus: &Step,
        payload_sets: &[PayloadSet],
        run_ctx: &RunCtx,
        dedup: &Dedup,
        baseline: &mut BaselineCache,
        result: &mut RunResult,
    ) -> Result<(), SessionError> {
        self.run_baseline_pass(page, focus, payload_sets, baseline, result).await?;

        'payload_sets: for set in payload_sets {
            for payload in &set.payloads {
                result.payloads_tested += 1;
                let confirmed = self
                    .run_one_payload(page, focus, set, payload, run_ctx, dedup, baseline, result)
                    .await?;
                if confirmed {
                    debug!(step_id = %focus.id, category = ?set.category, "confirmed finding, early-exiting payload loop");
                    break 'payload_sets;
                }
            }
        }
        Ok(())
    }

    async fn run_baseline_pass(
        &self,
        page: &PageHandle,
        focus: &Step,
        payload_sets: &[PayloadSet],
        baseline: &mut BaselineCache,
        result: &mut RunResult,
    ) -> Result<(), SessionError> {
        let substituted = substitute(focus, BASELINE_SENTINEL)?;
        let outcome = self.execute_substituted(page, &substituted, result).await?;

        let body = outcome.body_excerpt.clone().unwrap_or_default();
        let mut baseline_errors = std::collections::HashSet::new();
        for set in payload_sets {
            for pattern in &set.detect_patterns {
                if let Some(m) = pattern.find(&body) {
                    baseline_errors.insert(m.as_str().to_string());
                }
            }
        }

        baseline.record(
            focus.id.clone(),
            StepBaseline {
                status_code: outcome.status_code,
                body_length: body.len(),
                response_time_ms: outcome.latency_ms,
                baseline_errors,
            },
        );
        Ok(())
    }

    /// Run one payload iteration: substitute, `before_payload`, execute,
    /// drain events through the plugin host, `after_payload`. Returns
    /// `true` if a confirmed (non-reflection) finding resulted, signaling
    /// the caller to early-exit the remaining payloads for this step.
    #[allow(clippy::too_many_arguments)]
    async fn run_one_payload(
        &self,
        page: &PageHandle,
        focus: &Step,
        set: &PayloadSet,
        payload: &str,
        run_ctx: &RunCtx,
        dedup: &Dedup,
        baseline: &BaselineCache,
        result: &mut RunResult,
    ) -> Result<bool, SessionError> {
        let substituted = substitute(focus, payload)?;

        let ctx = DetectCtx {
            scan_id: run_ctx.scan_id.clone(),
            session_id: run_ctx.session_id.clone(),
            step_id: focus.id.clone(),
            category: set.category.clone(),
            payload_id: None,
            payload: payload.to_string(),
            is_baseline: false,
            url: None,
            status_code: None,
            body_excerpt: None,
            latency_ms: 0,
            baseline: Arc::new(baseline.clone()),
            detect_patterns: Arc::new(set.detect_patterns.clone()),
            findings: Arc::new(parking_lot::Mutex::new(Vec::new())),
        };

        if let BeforePayloadOutcome::Skip { reason } = self.plugins.before_payload(&ctx, &mut result.errors).await {
            debug!(step_id = %focus.id, reason, "plugin skipped payload");
            return Ok(false);
        }

        // Subscribe before executing: the driver may publish dialog/console/
        // network events synchronously inside `execute_step`, and a
        // broadcast receiver only observes events sent after it subscribes.
        let mut events_rx = self.driver.subscribe_events(page);

        let outcome = match self.execute_substituted(page, &substituted, result).await {
            Ok(outcome) => outcome,
            Err(e) if !e.is_session_fatal() => {
                result.errors.push(format!("payload '{payload}': {e}"));
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        let ctx = DetectCtx {
            status_code: outcome.status_code,
            body_excerpt: outcome.body_excerpt.clone(),
            latency_ms: outcome.latency_ms,
            url: outcome.url_after.clone(),
            ..ctx
        };

        let mut fused = Vec::new();
        for event in drain_available(&mut events_rx) {
            fused.extend(self.plugins.dispatch_event(event, &ctx, dedup, &mut result.errors).await);
        }
        fused.extend(self.plugins.after_payload(&ctx, dedup, &mut result.errors).await);

        let confirmed = fused.iter().any(|f| f.detection_method != DetectionMethod::Reflection);

        result.findings.extend(fused);
        Ok(confirmed)
    }

    async fn execute_substituted(
        &self,
        page: &PageHandle,
        substituted: &Substituted,
        result: &mut RunResult,
    ) -> Result<vulcn_driver::StepOutcome, SessionError> {
        let mut last = None;
        for step in substituted.steps() {
            let outcome = self.driver.execute_step(page, step).await?;
            result.steps_executed += 1;
            if !outcome.ok {
                if let Some(err) = outcome.error.clone() {
                    return Err(SessionError::Driver(err));
                }
            }
            last = Some(outcome);
        }
        Ok(last.expect("substitution always yields at least one step"))
    }
}

fn drain_available(rx: &mut broadcast::Receiver<PageEvent>) -> Vec<PageEvent> {
    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use vulcn_driver::stub::{ClosureBackend, StubResponse};
    use vulcn_driver::{Driver, StubDriver};
    use vulcn_event_bus::DialogEvent;
    use vulcn_plugin::builtins::ReflectedXssDetector;
    use vulcn_plugin::PluginHost;
    use vulcn_types::{Category, PageId, PayloadSet, ScanId, Session, Step, StepKind};

    use super::SessionRunner;

    fn navigate_session(name: &str, injectable: bool) -> Session {
        Session::new(
            name,
            vec![Step::new(StepKind::Navigate {
                url: "http://t/search?q=hello".to_string(),
                injectable_param: injectable.then(|| "q".to_string()),
                form_field: None,
            })],
        )
    }

    #[tokio::test]
    async fn non_injectable_session_runs_with_no_payload_iteration() {
        let driver = StubDriver::reflecting();
        let plugins = Arc::new(PluginHost::new());
        let runner = SessionRunner::new(driver, plugins);
        let session = navigate_session("plain", false);

        let result = runner.run(ScanId::new(), &session, &[], false).await;

        assert!(result.success);
        assert_eq!(result.steps_executed, 1);
        assert_eq!(result.payloads_tested, 0);
        assert!(result.findings.is_empty());
    }

    #[tokio::test]
    async fn focus_step_with_no_payload_sets_still_runs_the_baseline_pass() {
        let driver = StubDriver::reflecting();
        let plugins = Arc::new(PluginHost::new());
        let runner = SessionRunner::new(driver, plugins);
        let session = navigate_session("baseline-only", true);

        let result = runner.run(ScanId::new(), &session, &[], false).await;

        assert!(result.success);
        assert_eq!(result.steps_executed, 1);
        assert_eq!(result.payloads_tested, 0);
    }

    #[tokio::test]
    async fn confirmed_finding_early_exits_the_remaining_payloads() {
        let driver = StubDriver::new(Arc::new(ClosureBackend(|_page: &PageId, step: &Step| match &step.kind {
            StepKind::Navigate { url, .. } if url.contains("onerror=alert") => StubResponse {
                status_code: Some(200),
                body: "<html>reflected</html>".to_string(),
                dialog: Some(DialogEvent {
                    kind: vulcn_event_bus::DialogKind::Alert,
                    message: "1".to_string(),
                }),
                ..Default::default()
            },
            _ => StubResponse {
                status_code: Some(200),
                body: "<html>ok</html>".to_string(),
                ..Default::default()
            },
        })));
        let host = PluginHost::new();
        host.register(Arc::new(ReflectedXssDetector::new())).unwrap();
        let plugins = Arc::new(host);
        let runner = SessionRunner::new(driver, plugins);
        let session = navigate_session("confirm-then-stop", true);

        let set = PayloadSet::new(
            "xss",
            Category::Xss,
            "two payloads, first confirms",
            vec![
                "<img src=x onerror=alert(1)>".to_string(),
                "<script>alert(2)</script>".to_string(),
            ],
            vec![],
            "test",
        )
        .unwrap();

        let result = runner.run(ScanId::new(), &session, std::slice::from_ref(&set), false).await;

        assert!(result.success);
        assert_eq!(result.payloads_tested, 1, "second payload must not run after a confirmed finding");
        assert_eq!(result.findings.len(), 1);
    }

    #[tokio::test]
    async fn driver_closed_during_loading_aborts_the_session() {
        let driver = StubDriver::reflecting();
        driver.close().await.unwrap();
        let plugins = Arc::new(PluginHost::new());
        let runner = SessionRunner::new(driver, plugins);
        let session = navigate_session("already-closed", false);

        let result = runner.run(ScanId::new(), &session, &[], false).await;

        assert!(!result.success);
        assert!(result.errors.iter().any(|e| e.contains("loading")));
    }
}
