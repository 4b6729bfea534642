//! The `Finding` data model and its post-build enrichment (spec.md §4.6,
//! component C6).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vulcn_types::{Category, FindingId, PayloadId, StepId};

#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum DetectionMethod {
    /// The payload's dangerous characters were reflected unescaped in the
    /// response body (gated by the reflection check, spec.md §4.6).
    Reflection,
    /// A `PayloadSet::detect_patterns` regex matched the response body.
    ErrorPattern,
    /// Response latency significantly exceeded the session's baseline.
    Timing,
    /// A JS dialog fired in response to the payload.
    Dialog,
    /// Unexpected HTTP status code.
    StatusCode,
    Custom(String),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Finding {
    pub id: FindingId,
    pub r#type: Category,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub step_id: StepId,
    pub payload_id: Option<PayloadId>,
    pub payload: String,
    pub url: Option<String>,
    pub evidence: String,
    pub metadata: HashMap<String, String>,

    pub rule_id: String,
    pub cwe_id: Option<u32>,
    pub cwe_name: Option<String>,
    pub fingerprint: String,
    pub detection_method: DetectionMethod,
    pub detected_at: DateTime<Utc>,
}

/// Builder that fills in the enrichment fields (§4.6: rule id, CWE,
/// fingerprint, detection method) so callers only supply the raw facts.
pub struct FindingBuilder {
    category: Category,
    severity: Severity,
    title: String,
    description: String,
    step_id: StepId,
    payload_id: Option<PayloadId>,
    payload: String,
    url: Option<String>,
    evidence: String,
    metadata: HashMap<String, String>,
    detection_method: DetectionMethod,
}

impl FindingBuilder {
    pub fn new(
        category: Category,
        severity: Severity,
        title: impl Into<String>,
        step_id: StepId,
        payload: impl Into<String>,
        evidence: impl Into<String>,
        detection_method: DetectionMethod,
    ) -> Self {
        Self {
            category,
            severity,
            title: title.into(),
            description: String::new(),
            step_id,
            payload_id: None,
            payload: payload.into(),
            url: None,
            evidence: evidence.into(),
            metadata: HashMap::new(),
            detection_method,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn payload_id(mut self, id: PayloadId) -> Self {
        self.payload_id = Some(id);
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Finding {
        let rule_id = rule_id_for(&self.category);
        let (cwe_id, cwe_name) = match self.category.cwe() {
            Some((id, name)) => (Some(id), Some(name.to_string())),
            None => (None, None),
        };
        let fingerprint = compute_fingerprint(&self.category, &self.step_id, &self.payload);
        Finding {
            id: FindingId::new(),
            r#type: self.category,
            severity: self.severity,
            title: self.title,
            description: self.description,
            step_id: self.step_id,
            payload_id: self.payload_id,
            payload: self.payload,
            url: self.url,
            evidence: self.evidence,
            metadata: self.metadata,
            rule_id,
            cwe_id,
            cwe_name,
            fingerprint,
            detection_method: self.detection_method,
            detected_at: Utc::now(),
        }
    }
}

/// Lowercase wire token for a category, e.g. `Category::Xss` -> `"xss"`.
fn category_type_token(category: &Category) -> &str {
    match category {
        Category::Xss => "xss",
        Category::Sqli => "sqli",
        Category::CommandInjection => "command-injection",
        Category::PathTraversal => "path-traversal",
        Category::OpenRedirect => "open-redirect",
        Category::Xxe => "xxe",
        Category::Custom(name) => name.as_str(),
    }
}

/// `rule_id = "VULCN-" + UPPER(type)` per spec.md §3, e.g. `"VULCN-XSS"`.
fn rule_id_for(category: &Category) -> String {
    format!("VULCN-{}", category_type_token(category).to_uppercase())
}

/// Fingerprint dedup key: (type, step_id, payload[0..50]) per spec.md §4.6.
pub fn compute_fingerprint(category: &Category, step_id: &StepId, payload: &str) -> String {
    let truncated: String = payload.chars().take(50).collect();
    format!("{}:{}:{}", category_type_token(category), step_id, truncated)
}
