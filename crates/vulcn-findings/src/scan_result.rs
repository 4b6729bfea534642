//! Top-level scan output, the aggregate a `ScanOrchestrator` builds by
//! unioning every session's `RunResult` (spec.md §4.5).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vulcn_types::ScanId;

use crate::dedup::Dedup;
use crate::finding::Finding;
use crate::run_result::RunResult;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScanResult {
    pub scan_id: ScanId,
    pub sessions: Vec<RunResult>,
    pub findings: Vec<Finding>,
    pub steps_executed: u32,
    pub payloads_tested: u32,
    pub errors: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl ScanResult {
    /// Build the aggregate from completed session results, deduping
    /// findings by fingerprint across sessions (spec.md testable property
    /// 7: cross-session dedup).
    pub fn aggregate(scan_id: ScanId, started_at: DateTime<Utc>, sessions: Vec<RunResult>) -> Self {
        let dedup = Dedup::new();
        let mut findings = Vec::new();
        let mut steps_executed = 0;
        let mut payloads_tested = 0;
        let mut errors = Vec::new();

        for session in &sessions {
            steps_executed += session.steps_executed;
            payloads_tested += session.payloads_tested;
            errors.extend(session.errors.iter().cloned());
            for finding in &session.findings {
                if dedup.insert_if_new(&finding.fingerprint) {
                    findings.push(finding.clone());
                }
            }
        }

        let finished_at = Utc::now();
        let duration_ms = (finished_at - started_at).num_milliseconds().max(0) as u64;

        Self {
            scan_id,
            sessions,
            findings,
            steps_executed,
            payloads_tested,
            errors,
            started_at,
            finished_at,
            duration_ms,
        }
    }
}
