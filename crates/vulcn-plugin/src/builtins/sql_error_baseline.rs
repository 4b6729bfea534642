//! SQL-error / blind-timing detector (spec.md scenarios S3/S4, category
//! `sqli`). Two independent signals, both gated by the baseline pass so a
//! pre-existing error string or a naturally slow endpoint never reports
//! (baseline purity invariant, spec.md §4.6):
//!
//! - Error-pattern: the active payload set's `detect_patterns` matched
//!   against the response body, minus anything already present at baseline.
//! - Blind timing: response time at least 4000ms slower than baseline,
//!   for time-based blind payloads (`sql_blind_timing` payload set).

use async_trait::async_trait;
use vulcn_findings::{DetectionMethod, Finding, FindingBuilder, Severity};
use vulcn_types::Category;

use crate::context::DetectCtx;
use crate::errors::PluginResult;
use crate::manifest::PluginManifest;
use crate::plugin::Plugin;

/// Minimum timing delta over baseline to call a response blind-SQLi (ms).
const TIMING_THRESHOLD_MS: i64 = 4000;

pub struct SqlErrorBaselineDetector {
    manifest: PluginManifest,
}

impl Default for SqlErrorBaselineDetector {
    fn default() -> Self {
        Self {
            manifest: PluginManifest::new("vulcn.detect-sqli", "1.0.0")
                .with_hooks(["after_payload"]),
        }
    }
}

impl SqlErrorBaselineDetector {
    pub fn new() -> Self {
        Self::default()
    }

    fn applies(&self, ctx: &DetectCtx) -> bool {
        !ctx.is_baseline && ctx.category == Category::Sqli
    }

    fn error_pattern_match(&self, ctx: &DetectCtx) -> Option<String> {
        let body = ctx.body_excerpt.as_deref()?;
        ctx.detect_patterns
            .iter()
            .find_map(|re| re.find(body).map(|m| m.as_str().to_string()))
            .filter(|matched| !ctx.baseline.is_pre_existing(&ctx.step_id, matched))
    }

    fn timing_anomaly(&self, ctx: &DetectCtx) -> Option<i64> {
        ctx.baseline
            .timing_delta_ms(&ctx.step_id, ctx.latency_ms)
            .filter(|delta| *delta >= TIMING_THRESHOLD_MS)
    }
}

#[async_trait]
impl Plugin for SqlErrorBaselineDetector {
    fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    async fn after_payload(&self, ctx: &DetectCtx) -> PluginResult<Vec<Finding>> {
        if !self.applies(ctx) {
            return Ok(Vec::new());
        }

        let mut findings = Vec::new();

        if let Some(matched) = self.error_pattern_match(ctx) {
            findings.push(
                FindingBuilder::new(
                    Category::Sqli,
                    Severity::High,
                    "Database error pattern in response",
                    ctx.step_id.clone(),
                    ctx.payload.clone(),
                    matched.clone(),
                    DetectionMethod::ErrorPattern,
                )
                .description(format!("Response contained error pattern '{matched}' absent from the baseline response"))
                .metadata("detectionMethod", "error-based")
                .build(),
            );
        }

        if let Some(delta) = self.timing_anomaly(ctx) {
            findings.push(
                FindingBuilder::new(
                    Category::Sqli,
                    Severity::High,
                    "Response delayed consistent with time-based blind injection",
                    ctx.step_id.clone(),
                    ctx.payload.clone(),
                    format!("response {delta}ms slower than baseline"),
                    DetectionMethod::Timing,
                )
                .description("Observed latency exceeded the blind-timing threshold over this step's baseline")
                .metadata("detectionMethod", "timing-based")
                .build(),
            );
        }

        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use regex::Regex;
    use std::sync::Arc;
    use vulcn_findings::{BaselineCache, StepBaseline};
    use vulcn_types::{ScanId, SessionId, StepId};

    fn ctx(
        payload: &str,
        body: Option<&str>,
        latency_ms: u64,
        baseline: BaselineCache,
        step_id: StepId,
        patterns: Vec<Regex>,
    ) -> DetectCtx {
        DetectCtx {
            scan_id: ScanId::new(),
            session_id: SessionId::new(),
            step_id,
            category: Category::Sqli,
            payload_id: None,
            payload: payload.to_string(),
            is_baseline: false,
            url: None,
            status_code: Some(500),
            body_excerpt: body.map(str::to_string),
            latency_ms,
            baseline: Arc::new(baseline),
            detect_patterns: Arc::new(patterns),
            findings: Arc::new(Mutex::new(Vec::new())),
        }
    }

    #[tokio::test]
    async fn baselined_sql_error_is_suppressed() {
        let detector = SqlErrorBaselineDetector::new();
        let step_id = StepId::new();
        let mut baseline = BaselineCache::new();
        let mut step_baseline = StepBaseline::default();
        step_baseline.baseline_errors.insert("sql syntax error".to_string());
        baseline.record(step_id.clone(), step_baseline);

        let pattern = Regex::new("sql syntax error").unwrap();
        let c = ctx(
            "' OR 1=1--",
            Some("... sql syntax error ..."),
            10,
            baseline,
            step_id,
            vec![pattern],
        );
        let findings = detector.after_payload(&c).await.unwrap();
        assert!(findings.iter().all(|f| f.detection_method != DetectionMethod::ErrorPattern));
    }

    #[tokio::test]
    async fn new_sql_error_not_in_baseline_is_high_severity() {
        let detector = SqlErrorBaselineDetector::new();
        let step_id = StepId::new();
        let mut baseline = BaselineCache::new();
        baseline.record(step_id.clone(), StepBaseline::default());

        let pattern = Regex::new("sql syntax error").unwrap();
        let c = ctx(
            "' OR 1=1--",
            Some("... sql syntax error near '1=1' ..."),
            10,
            baseline,
            step_id,
            vec![pattern],
        );
        let findings = detector.after_payload(&c).await.unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].detection_method, DetectionMethod::ErrorPattern);
        assert_eq!(findings[0].severity, Severity::High);
    }

    #[tokio::test]
    async fn slow_response_over_threshold_is_timing_finding() {
        let detector = SqlErrorBaselineDetector::new();
        let step_id = StepId::new();
        let mut baseline = BaselineCache::new();
        baseline.record(
            step_id.clone(),
            StepBaseline {
                response_time_ms: 100,
                ..Default::default()
            },
        );

        let c = ctx("SLEEP(5)", None, 4300, baseline, step_id, Vec::new());
        let findings = detector.after_payload(&c).await.unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].detection_method, DetectionMethod::Timing);
    }

    #[tokio::test]
    async fn slight_delay_under_threshold_is_not_reported() {
        let detector = SqlErrorBaselineDetector::new();
        let step_id = StepId::new();
        let mut baseline = BaselineCache::new();
        baseline.record(
            step_id.clone(),
            StepBaseline {
                response_time_ms: 100,
                ..Default::default()
            },
        );

        let c = ctx("' OR 1=1--", None, 600, baseline, step_id, Vec::new());
        let findings = detector.after_payload(&c).await.unwrap();
        assert!(findings.is_empty());
    }
}
