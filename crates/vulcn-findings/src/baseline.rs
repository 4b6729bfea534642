//! Per-session baseline accounting (spec.md §4.4, §4.6): the `__baseline__`
//! pass records each step's unmodified behavior so later payload passes can
//! tell a pre-existing error apart from one the payload caused (baseline
//! purity invariant).

use std::collections::{HashMap, HashSet};

use vulcn_types::StepId;

#[derive(Clone, Debug, Default)]
pub struct StepBaseline {
    pub status_code: Option<u16>,
    pub body_length: usize,
    pub response_time_ms: u64,
    /// Error substrings already present in the unmodified response. A
    /// payload pass only reports an error-pattern finding for a string that
    /// was *not* already here.
    pub baseline_errors: HashSet<String>,
}

#[derive(Clone, Default)]
pub struct BaselineCache {
    by_step: HashMap<StepId, StepBaseline>,
}

impl BaselineCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, step_id: StepId, baseline: StepBaseline) {
        self.by_step.insert(step_id, baseline);
    }

    pub fn get(&self, step_id: &StepId) -> Option<&StepBaseline> {
        self.by_step.get(step_id)
    }

    /// True if `text` was already present in this step's baseline response —
    /// suppresses false positives from pre-existing error strings.
    pub fn is_pre_existing(&self, step_id: &StepId, text: &str) -> bool {
        self.by_step
            .get(step_id)
            .map(|b| b.baseline_errors.contains(text))
            .unwrap_or(false)
    }

    /// How much slower than baseline a response was, in milliseconds.
    /// Returns `None` if there is no baseline for this step.
    pub fn timing_delta_ms(&self, step_id: &StepId, observed_ms: u64) -> Option<i64> {
        self.by_step
            .get(step_id)
            .map(|b| observed_ms as i64 - b.response_time_ms as i64)
    }
}
