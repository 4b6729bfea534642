//! Top-level CLI error type and exit-code mapping (spec.md §6: "Exit codes
//! (CLI wrapper, informational): 0 no findings or info-only; 1 findings at
//! medium+ severity present, or fatal error").
//!
//! One scoped enum at the ambient/CLI boundary, the same split the teacher
//! keeps between its per-crate errors and `anyhow::Result` in `cli/app.rs`.

use thiserror::Error;
use vulcn_findings::{ScanResult, Severity};
use vulcn_orchestrator::OrchestratorError;

#[derive(Debug, Error)]
pub enum VulcnCliError {
    #[error("configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("scan failed: {0}")]
    Orchestrator(#[from] OrchestratorError),
}

/// Exit code for a completed scan (spec.md §6).
pub fn exit_code(result: &ScanResult) -> i32 {
    let has_actionable_finding = result.findings.iter().any(|f| f.severity >= Severity::Medium);
    if has_actionable_finding {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use vulcn_findings::{DetectionMethod, FindingBuilder, RunResult};
    use vulcn_types::{Category, ScanId, StepId};

    fn scan_with_findings(findings: Vec<vulcn_findings::Finding>) -> ScanResult {
        let mut run = RunResult::new(vulcn_types::SessionId::new(), "s");
        run.findings = findings;
        ScanResult::aggregate(ScanId::new(), Utc::now(), vec![run])
    }

    #[test]
    fn no_findings_exits_zero() {
        assert_eq!(exit_code(&scan_with_findings(vec![])), 0);
    }

    #[test]
    fn info_only_exits_zero() {
        let finding = FindingBuilder::new(
            Category::Xss,
            Severity::Info,
            "note",
            StepId::new(),
            "x",
            "evidence",
            DetectionMethod::Custom("note".into()),
        )
        .build();
        assert_eq!(exit_code(&scan_with_findings(vec![finding])), 0);
    }

    #[test]
    fn medium_or_above_exits_one() {
        let finding = FindingBuilder::new(
            Category::Sqli,
            Severity::High,
            "sqli",
            StepId::new(),
            "' OR 1=1",
            "evidence",
            DetectionMethod::ErrorPattern,
        )
        .build();
        assert_eq!(exit_code(&scan_with_findings(vec![finding])), 1);
    }
}
