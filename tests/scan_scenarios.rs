//! End-to-end scan scenarios driving the full `ScanOrchestrator` ->
//! `SessionRunner` -> `PluginHost` pipeline against a `StubDriver`, covering
//! the concrete testable properties from spec.md §8: benign reflection,
//! dialog-confirmed XSS, a baselined SQL error string, blind SQLi by
//! timing, cross-session dedup, and plugin-failure isolation.

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use vulcn_driver::stub::{ClosureBackend, StubResponse};
use vulcn_driver::StubDriver;
use vulcn_event_bus::{DialogEvent, DialogKind, NetworkResponseEvent};
use vulcn_findings::{Finding, RunResult, ScanResult, Severity};
use vulcn_orchestrator::ScanOrchestrator;
use vulcn_plugin::builtins::{ReflectedXssDetector, ReflectionGateDetector, ReportPlugin, SqlErrorBaselineDetector};
use vulcn_plugin::errors::PluginError;
use vulcn_plugin::manifest::PluginManifest;
use vulcn_plugin::plugin::Plugin;
use vulcn_plugin::{DetectCtx, PluginHost, PluginResult};
use vulcn_types::{Category, PageId, PayloadSet, Session, Step, StepKind};

fn search_session(name: &str) -> Session {
    Session::new(
        name,
        vec![Step::new(StepKind::Navigate {
            url: "http://t/search?q=hello".to_string(),
            injectable_param: Some("q".to_string()),
            form_field: None,
        })],
    )
}

fn query_value(step: &Step, param: &str) -> String {
    match &step.kind {
        StepKind::Navigate { url, .. } => Url::parse(url)
            .ok()
            .and_then(|u| u.query_pairs().find(|(k, _)| k == param).map(|(_, v)| v.into_owned()))
            .unwrap_or_default(),
        _ => String::new(),
    }
}

fn builtin_plugins() -> PluginHost {
    let host = PluginHost::new();
    host.register(Arc::new(ReflectedXssDetector::new())).unwrap();
    host.register(Arc::new(ReflectionGateDetector::new())).unwrap();
    host.register(Arc::new(SqlErrorBaselineDetector::new())).unwrap();
    host.register(Arc::new(ReportPlugin::new())).unwrap();
    host
}

async fn run_scan(driver: Arc<StubDriver>, plugins: Arc<PluginHost>, sessions: Vec<Session>, payload_sets: Vec<PayloadSet>) -> ScanResult {
    let orchestrator = ScanOrchestrator::new(driver, plugins);
    orchestrator.run(&sessions, &payload_sets).await.unwrap()
}

#[tokio::test]
async fn benign_payload_without_dangerous_chars_yields_no_findings() {
    let driver = StubDriver::reflecting();
    let plugins = Arc::new(builtin_plugins());
    let set = PayloadSet::new("benign", Category::Xss, "no dangerous chars", vec!["alert1".to_string()], vec![], "test").unwrap();

    let result = run_scan(driver, plugins, vec![search_session("benign")], vec![set]).await;

    assert!(result.findings.is_empty());
    assert!(result.sessions[0].findings.is_empty());
}

#[tokio::test]
async fn dangerous_payload_confirmed_by_dialog_is_one_high_severity_finding() {
    let driver = StubDriver::new(Arc::new(ClosureBackend(|_page: &PageId, step: &Step| {
        let value = query_value(step, "q");
        if value.contains("onerror=alert") {
            StubResponse {
                url_after: Some(format!("http://t/search?q={value}")),
                status_code: Some(200),
                body: format!("<html><body>{value}</body></html>"),
                dialog: Some(DialogEvent {
                    kind: DialogKind::Alert,
                    message: "1".to_string(),
                }),
                ..Default::default()
            }
        } else {
            StubResponse {
                status_code: Some(200),
                body: format!("<html><body>{value}</body></html>"),
                ..Default::default()
            }
        }
    })));
    let plugins = Arc::new(builtin_plugins());
    let set = PayloadSet::new(
        "xss",
        Category::Xss,
        "dialog-confirmed",
        vec!["<img src=x onerror=alert(1)>".to_string()],
        vec![],
        "test",
    )
    .unwrap();

    let result = run_scan(driver, plugins, vec![search_session("confirmed-xss")], vec![set]).await;

    assert_eq!(result.findings.len(), 1);
    let finding = &result.findings[0];
    assert_eq!(finding.r#type, Category::Xss);
    assert_eq!(finding.severity, Severity::High);
    assert_eq!(finding.metadata.get("detectionMethod").map(String::as_str), Some("active"));
}

#[tokio::test]
async fn sql_error_string_already_in_baseline_is_suppressed() {
    let driver = StubDriver::new(Arc::new(ClosureBackend(|_page: &PageId, _step: &Step| StubResponse {
        status_code: Some(200),
        body: "<html>warning: mysql_fetch_array() expects parameter 1 to be resource</html>".to_string(),
        ..Default::default()
    })));
    let plugins = Arc::new(builtin_plugins());
    let set = PayloadSet::new(
        "sqli-error",
        Category::Sqli,
        "error pattern already present before injection",
        vec!["'".to_string()],
        vec![r"mysql_fetch_array\(\)".to_string()],
        "test",
    )
    .unwrap();

    let result = run_scan(driver, plugins, vec![search_session("baselined-sqli")], vec![set]).await;

    assert!(result.findings.iter().all(|f| f.r#type != Category::Sqli));
}

#[tokio::test]
async fn slow_response_over_threshold_is_a_timing_finding() {
    let driver = StubDriver::new(Arc::new(ClosureBackend(|_page: &PageId, step: &Step| {
        let value = query_value(step, "q");
        let delay_ms = if value.contains("SLEEP") { 4100 } else { 0 };
        StubResponse {
            status_code: Some(200),
            body: "<html>ok</html>".to_string(),
            delay_ms,
            ..Default::default()
        }
    })));
    let plugins = Arc::new(builtin_plugins());
    let set = PayloadSet::new(
        "sqli-timing",
        Category::Sqli,
        "blind time-based",
        vec!["1' AND SLEEP(5)--".to_string()],
        vec![],
        "test",
    )
    .unwrap();

    let result = run_scan(driver, plugins, vec![search_session("blind-sqli")], vec![set]).await;

    assert_eq!(result.findings.len(), 1);
    let finding = &result.findings[0];
    assert_eq!(finding.r#type, Category::Sqli);
    assert_eq!(finding.metadata.get("detectionMethod").map(String::as_str), Some("timing-based"));
}

#[tokio::test]
async fn identical_finding_across_sessions_dedups_in_the_aggregate() {
    let driver = StubDriver::new(Arc::new(ClosureBackend(|_page: &PageId, step: &Step| {
        let value = query_value(step, "q");
        if value.contains("onerror=alert") {
            StubResponse {
                status_code: Some(200),
                body: format!("<html>{value}</html>"),
                dialog: Some(DialogEvent {
                    kind: DialogKind::Alert,
                    message: "1".to_string(),
                }),
                ..Default::default()
            }
        } else {
            StubResponse {
                status_code: Some(200),
                body: format!("<html>{value}</html>"),
                ..Default::default()
            }
        }
    })));
    let plugins = Arc::new(builtin_plugins());
    let set = PayloadSet::new(
        "xss",
        Category::Xss,
        "shared endpoint across sessions",
        vec!["<img src=x onerror=alert(1)>".to_string()],
        vec![],
        "test",
    )
    .unwrap();

    // Both sessions target the very same step (same `StepId`), modeling two
    // runs hitting the same injectable endpoint.
    let shared_step = Step::new(StepKind::Navigate {
        url: "http://t/search?q=hello".to_string(),
        injectable_param: Some("q".to_string()),
        form_field: None,
    });
    let session_a = Session::new("session-a", vec![shared_step.clone()]);
    let session_b = Session::new("session-b", vec![shared_step]);

    let result = run_scan(driver, plugins, vec![session_a, session_b], vec![set]).await;

    assert_eq!(result.findings.len(), 1);
    assert_eq!(result.sessions[0].findings.len(), 1);
    assert_eq!(result.sessions[1].findings.len(), 1);
}

/// A detector that always fails its `network_response` hook, used to prove
/// one misbehaving plugin doesn't take down the scan or other detectors'
/// findings (spec.md §8 plugin-failure isolation).
struct AlwaysFailsOnNetwork {
    manifest: PluginManifest,
}

impl AlwaysFailsOnNetwork {
    fn new() -> Self {
        Self {
            manifest: PluginManifest::new("test.always-fails-network", "1.0.0").with_hooks(["network_response"]),
        }
    }
}

#[async_trait]
impl Plugin for AlwaysFailsOnNetwork {
    fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    async fn network_response(
        &self,
        _event: &vulcn_event_bus::NetworkResponseEvent,
        _ctx: &DetectCtx,
    ) -> PluginResult<Option<Finding>> {
        Err(PluginError::Hook("boom".to_string()))
    }
}

#[tokio::test]
async fn failing_detector_does_not_break_the_scan_or_other_findings() {
    let driver = StubDriver::new(Arc::new(ClosureBackend(|_page: &PageId, step: &Step| {
        let value = query_value(step, "q");
        if value.contains("onerror=alert") {
            StubResponse {
                status_code: Some(200),
                body: format!("<html>{value}</html>"),
                dialog: Some(DialogEvent {
                    kind: DialogKind::Alert,
                    message: "1".to_string(),
                }),
                network: Some(NetworkResponseEvent {
                    url: "http://t/search".to_string(),
                    status: 200,
                    response_time_ms: 5,
                    body_length: Some(value.len()),
                }),
                ..Default::default()
            }
        } else {
            StubResponse {
                status_code: Some(200),
                body: format!("<html>{value}</html>"),
                ..Default::default()
            }
        }
    })));

    let host = PluginHost::new();
    host.register(Arc::new(ReflectedXssDetector::new())).unwrap();
    host.register(Arc::new(AlwaysFailsOnNetwork::new())).unwrap();
    host.register(Arc::new(ReportPlugin::new())).unwrap();
    let plugins = Arc::new(host);

    let set = PayloadSet::new(
        "xss",
        Category::Xss,
        "dialog-confirmed with a failing sibling plugin",
        vec!["<img src=x onerror=alert(1)>".to_string()],
        vec![],
        "test",
    )
    .unwrap();

    let result = run_scan(driver, plugins, vec![search_session("plugin-failure")], vec![set]).await;

    assert_eq!(result.findings.len(), 1);
    assert_eq!(result.findings[0].severity, Severity::High);
    let run: &RunResult = &result.sessions[0];
    assert!(run.errors.iter().any(|e| e.contains("test.always-fails-network")));
}
