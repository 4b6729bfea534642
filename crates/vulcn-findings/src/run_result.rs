//! Per-session scan output (spec.md §3, §4.4).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vulcn_types::SessionId;

use crate::finding::Finding;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunResult {
    pub session_id: SessionId,
    pub session_name: String,
    pub success: bool,
    pub steps_executed: u32,
    pub payloads_tested: u32,
    pub findings: Vec<Finding>,
    pub errors: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl RunResult {
    pub fn new(session_id: SessionId, session_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            session_name: session_name.into(),
            success: true,
            steps_executed: 0,
            payloads_tested: 0,
            findings: Vec::new(),
            errors: Vec::new(),
            started_at: now,
            finished_at: now,
            duration_ms: 0,
        }
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self.duration_ms = (self.finished_at - self.started_at).num_milliseconds().max(0) as u64;
        self
    }
}
