//! Plugin Host (spec.md §4.3, component C3): dispatches lifecycle hooks in
//! registration order, fuses returned findings by fingerprint within a
//! payload window, and runs the `run_end`/`scan_end` transform pipes.
//!
//! Grounded on `l7-plugin/src/runtime.rs`'s `PluginRuntime::invoke()` shape
//! (resolve plugin -> call hook -> record outcome), simplified to the
//! spec's in-process trait-object plugins: no sandboxing, no per-tenant
//! policy gating, since spec.md's Non-goals exclude a sandboxed plugin
//! model.

use std::sync::Arc;

use tracing::{debug, error, warn};
use vulcn_findings::{compute_fingerprint, Dedup, Finding, RunResult, ScanResult};

use crate::context::{DetectCtx, ObservedEvent, RunCtx, ScanCtx};
use crate::errors::PluginResult;
use crate::plugin::{BeforePayloadOutcome, Plugin};
use crate::registry::PluginRegistry;
use vulcn_event_bus::PageEvent;

pub struct PluginHost {
    registry: PluginRegistry,
}

impl Default for PluginHost {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginHost {
    pub fn new() -> Self {
        Self {
            registry: PluginRegistry::new(),
        }
    }

    pub fn register(&self, plugin: Arc<dyn Plugin>) -> PluginResult<()> {
        self.registry.register(plugin)
    }

    pub fn plugin_count(&self) -> usize {
        self.registry.len()
    }

    /// `init`/`scan_start`/`scan_end` failures are fatal (spec §4.3, §7):
    /// the caller aborts the scan, surfacing the plugin's error verbatim.
    pub async fn init_all(&self) -> PluginResult<()> {
        for plugin in self.registry.ordered() {
            plugin.init().await.map_err(|e| {
                error!(plugin = %plugin.manifest().name, error = %e, "plugin init failed");
                e
            })?;
        }
        Ok(())
    }

    pub async fn destroy_all(&self) {
        for plugin in self.registry.ordered() {
            plugin.destroy().await;
        }
    }

    pub async fn scan_start(&self, ctx: &ScanCtx) -> PluginResult<()> {
        for plugin in self.registry.ordered() {
            plugin.scan_start(ctx).await.map_err(|e| {
                error!(plugin = %plugin.manifest().name, error = %e, "plugin scan_start failed");
                e
            })?;
        }
        Ok(())
    }

    /// Transform pipe: each plugin receives the current aggregate and
    /// returns the (possibly modified) one the next plugin sees. The report
    /// plugin, registered last, is the final link in the chain.
    pub async fn scan_end(&self, mut result: ScanResult, ctx: &ScanCtx) -> PluginResult<ScanResult> {
        for plugin in self.registry.ordered() {
            result = plugin.scan_end(result, ctx).await.map_err(|e| {
                error!(plugin = %plugin.manifest().name, error = %e, "plugin scan_end failed");
                e
            })?;
        }
        Ok(result)
    }

    /// `run_start` failures are scoped to Loading (spec §4.4): logged and
    /// surfaced to the caller so the session aborts, but do not abort the
    /// rest of the scan.
    pub async fn run_start(&self, ctx: &RunCtx) -> PluginResult<()> {
        for plugin in self.registry.ordered() {
            if let Err(e) = plugin.run_start(ctx).await {
                warn!(plugin = %plugin.manifest().name, error = %e, "plugin run_start failed");
                return Err(e);
            }
        }
        Ok(())
    }

    /// Transform pipe. Per spec §4.3 scan-vs-run semantics, a single-session
    /// scan's `run_end` is where the report plugin would emit — callers
    /// distinguish via `RunCtx::scan_mode`.
    pub async fn run_end(&self, mut result: RunResult, ctx: &RunCtx) -> RunResult {
        for plugin in self.registry.ordered() {
            match plugin.run_end(result.clone(), ctx).await {
                Ok(next) => result = next,
                Err(e) => {
                    warn!(plugin = %plugin.manifest().name, error = %e, "plugin run_end failed, keeping prior result");
                    result.errors.push(format!("plugin '{}' run_end: {e}", plugin.manifest().name));
                }
            }
        }
        result
    }

    /// Runs `before_payload` across all plugins. A plugin failure here is a
    /// per-event handler failure (logged, skipped); any plugin voting to
    /// skip short-circuits the payload (spec §4.3).
    pub async fn before_payload(&self, ctx: &DetectCtx, errors: &mut Vec<String>) -> BeforePayloadOutcome {
        for plugin in self.registry.ordered() {
            match plugin.before_payload(ctx).await {
                Ok(BeforePayloadOutcome::Skip { reason }) => {
                    debug!(plugin = %plugin.manifest().name, reason, "plugin short-circuited payload");
                    return BeforePayloadOutcome::Skip { reason };
                }
                Ok(BeforePayloadOutcome::Continue) => {}
                Err(e) => {
                    warn!(plugin = %plugin.manifest().name, error = %e, "before_payload failed");
                    errors.push(format!("plugin '{}' before_payload: {e}", plugin.manifest().name));
                }
            }
        }
        BeforePayloadOutcome::Continue
    }

    /// Dispatches one driver event (dialog/console/network_response) to
    /// every plugin, fusing returned findings by fingerprint within the
    /// current payload window, and draining anything a passive scanner
    /// pushed directly onto `ctx.findings` (spec §4.3 fusion rule).
    pub async fn dispatch_event(&self, event: PageEvent, ctx: &DetectCtx, dedup: &Dedup, errors: &mut Vec<String>) -> Vec<Finding> {
        let observed: ObservedEvent = event.into();
        let mut fused = Vec::new();
        for plugin in self.registry.ordered() {
            let outcome = match &observed {
                ObservedEvent::Dialog(ev) => plugin.dialog(ev, ctx).await,
                ObservedEvent::Console(ev) => plugin.console(ev, ctx).await,
                ObservedEvent::NetworkResponse(ev) => plugin.network_response(ev, ctx).await,
            };
            match outcome {
                Ok(Some(finding)) => {
                    if dedup.insert_if_new(&finding.fingerprint) {
                        fused.push(finding);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(plugin = %plugin.manifest().name, error = %e, "event hook failed");
                    errors.push(format!("plugin '{}' event hook: {e}", plugin.manifest().name));
                }
            }
        }
        fused.extend(self.drain_pushed_findings(ctx, dedup));
        fused
    }

    /// Runs `after_payload` across all plugins, fusing their returned
    /// findings (and anything pushed directly into `ctx.findings`) by
    /// fingerprint within the payload window.
    pub async fn after_payload(&self, ctx: &DetectCtx, dedup: &Dedup, errors: &mut Vec<String>) -> Vec<Finding> {
        let mut fused = Vec::new();
        for plugin in self.registry.ordered() {
            match plugin.after_payload(ctx).await {
                Ok(findings) => {
                    for finding in findings {
                        if dedup.insert_if_new(&finding.fingerprint) {
                            fused.push(finding);
                        }
                    }
                }
                Err(e) => {
                    warn!(plugin = %plugin.manifest().name, error = %e, "after_payload failed");
                    errors.push(format!("plugin '{}' after_payload: {e}", plugin.manifest().name));
                }
            }
        }
        fused.extend(self.drain_pushed_findings(ctx, dedup));
        fused
    }

    fn drain_pushed_findings(&self, ctx: &DetectCtx, dedup: &Dedup) -> Vec<Finding> {
        let mut pushed = ctx.findings.lock();
        let drained: Vec<Finding> = pushed.drain(..).collect();
        drained
            .into_iter()
            .filter(|f| dedup.insert_if_new(&f.fingerprint))
            .collect()
    }
}

/// Re-derive the fingerprint a `DetectCtx`-scoped finding would carry,
/// for callers that need to check dedup state before building a `Finding`.
pub fn fingerprint_for(ctx: &DetectCtx) -> String {
    compute_fingerprint(&ctx.category, &ctx.step_id, &ctx.payload)
}
