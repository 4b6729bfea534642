//! The `Plugin` trait (spec.md §6): the stable interface every detector,
//! passive scanner, and report plugin implements. Every hook has a no-op
//! default so a plugin only overrides the hooks it actually uses — "unknown
//! hooks are ignored" (spec.md §6) is satisfied by simply not overriding
//! them.

use async_trait::async_trait;
use vulcn_findings::{Finding, RunResult, ScanResult};

use crate::context::{DetectCtx, RunCtx, ScanCtx};
use crate::errors::PluginResult;
use crate::manifest::PluginManifest;

/// Outcome of `before_payload`: a plugin may short-circuit the payload
/// iteration entirely (spec.md §4.3: "synchronous, may short-circuit
/// payload").
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BeforePayloadOutcome {
    Continue,
    Skip { reason: String },
}

impl Default for BeforePayloadOutcome {
    fn default() -> Self {
        BeforePayloadOutcome::Continue
    }
}

#[async_trait]
pub trait Plugin: Send + Sync {
    fn manifest(&self) -> &PluginManifest;

    async fn init(&self) -> PluginResult<()> {
        Ok(())
    }

    async fn destroy(&self) {}

    async fn scan_start(&self, _ctx: &ScanCtx) -> PluginResult<()> {
        Ok(())
    }

    /// Transform-pipe hook: receives the current aggregate, returns the
    /// (possibly modified) one for the next plugin to see (spec.md §4.3).
    async fn scan_end(&self, result: ScanResult, _ctx: &ScanCtx) -> PluginResult<ScanResult> {
        Ok(result)
    }

    async fn run_start(&self, _ctx: &RunCtx) -> PluginResult<()> {
        Ok(())
    }

    /// Transform-pipe hook, same contract as `scan_end` but per-session.
    async fn run_end(&self, result: RunResult, _ctx: &RunCtx) -> PluginResult<RunResult> {
        Ok(result)
    }

    async fn before_payload(&self, _ctx: &DetectCtx) -> PluginResult<BeforePayloadOutcome> {
        Ok(BeforePayloadOutcome::Continue)
    }

    async fn after_payload(&self, _ctx: &DetectCtx) -> PluginResult<Vec<Finding>> {
        Ok(Vec::new())
    }

    async fn dialog(
        &self,
        _event: &vulcn_event_bus::DialogEvent,
        _ctx: &DetectCtx,
    ) -> PluginResult<Option<Finding>> {
        Ok(None)
    }

    async fn console(
        &self,
        _event: &vulcn_event_bus::ConsoleEvent,
        _ctx: &DetectCtx,
    ) -> PluginResult<Option<Finding>> {
        Ok(None)
    }

    async fn network_response(
        &self,
        _event: &vulcn_event_bus::NetworkResponseEvent,
        _ctx: &DetectCtx,
    ) -> PluginResult<Option<Finding>> {
        Ok(None)
    }
}
