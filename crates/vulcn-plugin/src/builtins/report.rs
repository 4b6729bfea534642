//! Summary report plugin (spec.md §4.3 scan-vs-run semantics): a transform
//! pipe that never mutates a result, only observes it, and logs a single
//! structured summary line at `scan_end` — never at each session's
//! `run_end`, so a multi-session scan produces one summary, not N.
//!
//! Registered last in the pipeline (spec.md §6) so it sees whatever the
//! detector plugins left behind after every other `scan_end` hook ran.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::info;
use vulcn_findings::{RunResult, ScanResult, Severity};

use crate::context::{RunCtx, ScanCtx};
use crate::errors::PluginResult;
use crate::manifest::PluginManifest;
use crate::plugin::Plugin;

pub struct ReportPlugin {
    manifest: PluginManifest,
    sessions_completed: AtomicUsize,
}

impl Default for ReportPlugin {
    fn default() -> Self {
        Self {
            manifest: PluginManifest::new("vulcn.report", "1.0.0").with_hooks(["run_end", "scan_end"]),
            sessions_completed: AtomicUsize::new(0),
        }
    }
}

impl ReportPlugin {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Plugin for ReportPlugin {
    fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    async fn run_end(&self, result: RunResult, _ctx: &RunCtx) -> PluginResult<RunResult> {
        self.sessions_completed.fetch_add(1, Ordering::Relaxed);
        Ok(result)
    }

    async fn scan_end(&self, mut result: ScanResult, ctx: &ScanCtx) -> PluginResult<ScanResult> {
        let by_severity = result.findings.iter().fold([0usize; 5], |mut acc, f| {
            acc[f.severity as usize] += 1;
            acc
        });

        // On-wire enrichment (spec §6): `security_severity` alongside
        // `rule_id`/`cwe`/`fingerprint`, added here since this plugin runs
        // last and produces the final report-facing result.
        for finding in &mut result.findings {
            finding.metadata.insert("securitySeverity".to_string(), security_severity_label(finding.severity).to_string());
        }

        info!(
            scan_id = %ctx.scan_id,
            sessions = ctx.session_count,
            sessions_completed = self.sessions_completed.load(Ordering::Relaxed),
            steps_executed = result.steps_executed,
            payloads_tested = result.payloads_tested,
            findings = result.findings.len(),
            info = by_severity[0],
            low = by_severity[1],
            medium = by_severity[2],
            high = by_severity[3],
            critical = by_severity[4],
            "scan finished",
        );
        Ok(result)
    }
}

fn security_severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "info",
        Severity::Low => "low",
        Severity::Medium => "medium",
        Severity::High => "high",
        Severity::Critical => "critical",
    }
}
