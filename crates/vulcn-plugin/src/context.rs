//! Hook contexts passed to plugins at each lifecycle stage (spec.md §4.3,
//! §6). Grounded on `l7-plugin/src/hooks/mod.rs`'s `HookCtx` shape,
//! specialized per hook family instead of one generic context, since the
//! spec's hook signatures each carry different data
//! (`scan_ctx`/`run_ctx`/`detect_ctx`).

use std::sync::Arc;

use parking_lot::Mutex;
use vulcn_types::{Category, PayloadId, ScanId, SessionId, StepId};

use vulcn_event_bus::PageEvent;
use vulcn_findings::{BaselineCache, Finding};

/// Sentinel payload value used for the baseline pass (spec.md §4.4 step 1).
/// Detectors observe this marker and switch to passive accumulation instead
/// of emitting findings.
pub const BASELINE_SENTINEL: &str = "__baseline__";

/// Context live for the whole scan, handed to `scan_start`/`scan_end`.
#[derive(Clone, Debug)]
pub struct ScanCtx {
    pub scan_id: ScanId,
    pub session_names: Vec<String>,
    pub session_count: usize,
}

/// Context live for one session, handed to `run_start`/`run_end`.
#[derive(Clone, Debug)]
pub struct RunCtx {
    pub scan_id: ScanId,
    pub session_id: SessionId,
    pub session_name: String,
    /// `true` once the scan covers more than one session (spec.md §4.3
    /// scan-vs-run semantics: the report plugin only emits on `scan_end`
    /// when this is set).
    pub scan_mode: bool,
}

/// Context live for one payload iteration on one step, handed to
/// `before_payload`/`after_payload`/`dialog`/`console`/`network_response`.
#[derive(Clone)]
pub struct DetectCtx {
    pub scan_id: ScanId,
    pub session_id: SessionId,
    pub step_id: StepId,
    pub category: Category,
    pub payload_id: Option<PayloadId>,
    pub payload: String,
    /// `true` during the once-per-step baseline pass (payload ==
    /// `BASELINE_SENTINEL`): detectors must not emit findings, only observe.
    pub is_baseline: bool,
    pub url: Option<String>,
    pub status_code: Option<u16>,
    pub body_excerpt: Option<String>,
    pub latency_ms: u64,
    pub baseline: Arc<BaselineCache>,
    /// The active payload set's compiled `detect_patterns` (spec.md §3),
    /// so error-pattern detectors don't need their own copy.
    pub detect_patterns: Arc<Vec<regex::Regex>>,
    /// Shared accumulation buffer findings may be appended to directly
    /// (spec.md §4.3 fusion rule: "a handler may also append directly to
    /// `ctx.findings`"), in addition to returning them from a hook.
    pub findings: Arc<Mutex<Vec<Finding>>>,
}

impl DetectCtx {
    pub fn push_finding(&self, finding: Finding) {
        self.findings.lock().push(finding);
    }

    pub fn has_dangerous_chars(&self) -> bool {
        contains_dangerous_chars(&self.payload)
    }
}

/// Reflection gate (spec.md §4.6, testable property 5): a payload lacking
/// these characters can never produce a meaningful reflected-XSS finding.
pub fn contains_dangerous_chars(payload: &str) -> bool {
    payload.chars().any(|c| matches!(c, '<' | '>' | '\'' | '"' | '(' | ')'))
}

/// One observed driver event, paired with the `DetectCtx` it arrived under,
/// so the host can dispatch `dialog`/`console`/`network_response` uniformly.
pub enum ObservedEvent {
    Dialog(vulcn_event_bus::DialogEvent),
    Console(vulcn_event_bus::ConsoleEvent),
    NetworkResponse(vulcn_event_bus::NetworkResponseEvent),
}

impl From<PageEvent> for ObservedEvent {
    fn from(event: PageEvent) -> Self {
        match event {
            PageEvent::Dialog(d) => ObservedEvent::Dialog(d),
            PageEvent::Console(c) => ObservedEvent::Console(c),
            PageEvent::NetworkResponse(n) => ObservedEvent::NetworkResponse(n),
        }
    }
}
