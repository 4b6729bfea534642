//! Generic reflection-gate detector for the catch-all `reflection` payload
//! category (spec.md §3 payload sets; represented as `Category::Custom`
//! since `vulcn_types::Category` has no dedicated variant — see DESIGN.md).
//!
//! Lower confidence than `ReflectedXssDetector`: it reports any unescaped
//! reflection of a dangerous-character payload as a low-severity finding,
//! without requiring a dialog to confirm execution. Exists to demonstrate
//! the reflection gate (testable property 5) applies independently of the
//! `xss` category.

use async_trait::async_trait;
use vulcn_findings::{DetectionMethod, Finding, FindingBuilder, Severity};
use vulcn_types::Category;

use crate::context::DetectCtx;
use crate::errors::PluginResult;
use crate::manifest::PluginManifest;
use crate::plugin::Plugin;

const REFLECTION_CATEGORY: &str = "reflection";

pub struct ReflectionGateDetector {
    manifest: PluginManifest,
}

impl Default for ReflectionGateDetector {
    fn default() -> Self {
        Self {
            manifest: PluginManifest::new("vulcn.detect-reflection", "1.0.0")
                .with_hooks(["after_payload"]),
        }
    }
}

impl ReflectionGateDetector {
    pub fn new() -> Self {
        Self::default()
    }

    fn applies(&self, ctx: &DetectCtx) -> bool {
        if ctx.is_baseline || !ctx.has_dangerous_chars() {
            return false;
        }
        matches!(&ctx.category, Category::Custom(name) if name == REFLECTION_CATEGORY)
    }
}

#[async_trait]
impl Plugin for ReflectionGateDetector {
    fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    async fn after_payload(&self, ctx: &DetectCtx) -> PluginResult<Vec<Finding>> {
        if !self.applies(ctx) {
            return Ok(Vec::new());
        }
        let Some(body) = ctx.body_excerpt.as_deref() else {
            return Ok(Vec::new());
        };
        if !body.contains(ctx.payload.as_str()) {
            return Ok(Vec::new());
        }
        let finding = FindingBuilder::new(
            ctx.category.clone(),
            Severity::Low,
            "Unescaped reflection of injected payload",
            ctx.step_id.clone(),
            ctx.payload.clone(),
            body.to_string(),
            DetectionMethod::Reflection,
        )
        .description("Payload characters were reflected unescaped; not confirmed to execute")
        .metadata("detectionMethod", "passive")
        .build();
        Ok(vec![finding])
    }
}
