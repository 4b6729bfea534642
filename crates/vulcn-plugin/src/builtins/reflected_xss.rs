//! Reflected-XSS detector (spec.md scenarios S1/S2, category `xss`).
//!
//! Two-tier detection: `after_payload` reports a low-confidence finding
//! when the raw payload comes back unescaped in the response body;
//! `dialog` upgrades to a confirmed, active finding when the payload
//! actually executed and popped a JS dialog (S2). The reflection gate
//! (testable property 5) is enforced up front — a payload without
//! dangerous characters never produces a finding, matching S1.

use async_trait::async_trait;
use vulcn_findings::{DetectionMethod, Finding, FindingBuilder, Severity};
use vulcn_types::Category;

use crate::context::DetectCtx;
use crate::errors::PluginResult;
use crate::manifest::PluginManifest;
use crate::plugin::Plugin;

pub struct ReflectedXssDetector {
    manifest: PluginManifest,
}

impl Default for ReflectedXssDetector {
    fn default() -> Self {
        Self {
            manifest: PluginManifest::new("vulcn.detect-xss", "1.0.0")
                .with_hooks(["after_payload", "dialog"]),
        }
    }
}

impl ReflectedXssDetector {
    pub fn new() -> Self {
        Self::default()
    }

    fn applies(&self, ctx: &DetectCtx) -> bool {
        !ctx.is_baseline && ctx.category == Category::Xss && ctx.has_dangerous_chars()
    }

    fn reflected_unescaped(&self, ctx: &DetectCtx) -> bool {
        ctx.body_excerpt
            .as_deref()
            .map(|body| body.contains(ctx.payload.as_str()))
            .unwrap_or(false)
    }
}

#[async_trait]
impl Plugin for ReflectedXssDetector {
    fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    async fn after_payload(&self, ctx: &DetectCtx) -> PluginResult<Vec<Finding>> {
        if !self.applies(ctx) || !self.reflected_unescaped(ctx) {
            return Ok(Vec::new());
        }
        let finding = FindingBuilder::new(
            Category::Xss,
            Severity::Medium,
            "Reflected input without dialog confirmation",
            ctx.step_id.clone(),
            ctx.payload.clone(),
            ctx.body_excerpt.clone().unwrap_or_default(),
            DetectionMethod::Reflection,
        )
        .description("Payload with dangerous characters was reflected unescaped in the response body")
        .metadata("detectionMethod", "active")
        .build();
        Ok(vec![finding])
    }

    async fn dialog(
        &self,
        event: &vulcn_event_bus::DialogEvent,
        ctx: &DetectCtx,
    ) -> PluginResult<Option<Finding>> {
        if !self.applies(ctx) {
            return Ok(None);
        }
        let finding = FindingBuilder::new(
            Category::Xss,
            Severity::High,
            "Confirmed reflected XSS via JavaScript dialog",
            ctx.step_id.clone(),
            ctx.payload.clone(),
            event.message.clone(),
            DetectionMethod::Dialog,
        )
        .description("Injected payload executed in the browser, confirmed by a JS dialog firing")
        .metadata("detectionMethod", "active")
        .build();
        Ok(Some(finding))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::BASELINE_SENTINEL;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use vulcn_findings::BaselineCache;
    use vulcn_types::{ScanId, SessionId, StepId};

    fn ctx(payload: &str, body: Option<&str>, is_baseline: bool) -> DetectCtx {
        DetectCtx {
            scan_id: ScanId::new(),
            session_id: SessionId::new(),
            step_id: StepId::new(),
            category: Category::Xss,
            payload_id: None,
            payload: payload.to_string(),
            is_baseline,
            url: None,
            status_code: Some(200),
            body_excerpt: body.map(str::to_string),
            latency_ms: 10,
            baseline: Arc::new(BaselineCache::new()),
            detect_patterns: Arc::new(Vec::new()),
            findings: Arc::new(Mutex::new(Vec::new())),
        }
    }

    #[tokio::test]
    async fn benign_payload_without_dangerous_chars_is_not_a_finding() {
        let detector = ReflectedXssDetector::new();
        let c = ctx("alert1", Some("alert1"), false);
        let findings = detector.after_payload(&c).await.unwrap();
        assert!(findings.is_empty());
    }

    #[tokio::test]
    async fn reflected_dangerous_payload_without_dialog_is_medium() {
        let detector = ReflectedXssDetector::new();
        let payload = "\"><img src=x onerror=alert(1)>";
        let c = ctx(payload, Some(&format!("<html>{payload}</html>")), false);
        let findings = detector.after_payload(&c).await.unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Medium);
    }

    #[tokio::test]
    async fn baseline_pass_never_emits() {
        let detector = ReflectedXssDetector::new();
        let payload = BASELINE_SENTINEL;
        let c = ctx(payload, Some(payload), true);
        let findings = detector.after_payload(&c).await.unwrap();
        assert!(findings.is_empty());
    }

    #[tokio::test]
    async fn dialog_confirmation_is_high_severity() {
        let detector = ReflectedXssDetector::new();
        let payload = "<img src=x onerror=alert(1)>";
        let c = ctx(payload, Some(payload), false);
        let event = vulcn_event_bus::DialogEvent {
            kind: vulcn_event_bus::DialogKind::Alert,
            message: "1".to_string(),
        };
        let finding = detector.dialog(&event, &c).await.unwrap().unwrap();
        assert_eq!(finding.severity, Severity::High);
        assert_eq!(finding.detection_method, DetectionMethod::Dialog);
    }
}
