//! Gate controller: turns a run result into an exit decision.
//!
//! Detection and enforcement are separate: a run always produces its full report,
//! and `fail_on_findings` only decides whether violations fail the process.

use crate::engine::Evaluation;
use scangate_types::{Finding, VerdictStatus, Violation};

/// What the process should signal on exit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitIntent {
    /// Pass, or violations found while not enforcing.
    Success,
    /// Violations found with enforcement enabled.
    PolicyViolation,
    /// Run-level error (e.g. policy could not be loaded).
    Aborted,
}

impl ExitIntent {
    /// 0 = pass or non-enforcing, 2 = enforced policy failure, 1 = aborted.
    pub fn code(self) -> i32 {
        match self {
            ExitIntent::Success => 0,
            ExitIntent::PolicyViolation => 2,
            ExitIntent::Aborted => 1,
        }
    }
}

/// Aggregate outcome of one orchestration run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunResult {
    pub findings: Vec<Finding>,
    pub violations: Vec<Violation>,
    pub conflicts: Vec<String>,
    /// `true` iff there are no violations.
    pub passed: bool,
    pub compliance_checked: bool,
    pub aborted: bool,
    pub exit_intent: ExitIntent,
}

impl RunResult {
    /// Finalize a run whose findings were evaluated against a policy.
    pub fn evaluated(findings: Vec<Finding>, evaluation: Evaluation, fail_on_findings: bool) -> Self {
        let mut result = Self {
            passed: evaluation.violations.is_empty(),
            findings,
            violations: evaluation.violations,
            conflicts: evaluation.conflicts,
            compliance_checked: true,
            aborted: false,
            exit_intent: ExitIntent::Success,
        };
        result.exit_intent = gate(&result, fail_on_findings);
        result
    }

    /// Finalize a run with compliance checking disabled.
    pub fn unevaluated(findings: Vec<Finding>) -> Self {
        Self {
            findings,
            violations: Vec::new(),
            conflicts: Vec::new(),
            passed: true,
            compliance_checked: false,
            aborted: false,
            exit_intent: ExitIntent::Success,
        }
    }

    /// Finalize a run that aborted before evaluation. Findings are kept for reporting.
    pub fn aborted(findings: Vec<Finding>) -> Self {
        Self {
            findings,
            violations: Vec::new(),
            conflicts: Vec::new(),
            passed: false,
            compliance_checked: false,
            aborted: true,
            exit_intent: ExitIntent::Aborted,
        }
    }

    pub fn verdict_status(&self) -> VerdictStatus {
        if self.aborted {
            return VerdictStatus::Fail;
        }
        if !self.compliance_checked {
            return VerdictStatus::Skip;
        }
        if self.violations.is_empty() {
            return VerdictStatus::Pass;
        }
        match self.exit_intent {
            ExitIntent::PolicyViolation => VerdictStatus::Fail,
            _ => VerdictStatus::Warn,
        }
    }
}

/// Select the exit intent for a run.
///
/// `fail_on_findings = false` always succeeds (unless the run aborted);
/// `fail_on_findings = true` fails iff there are violations.
pub fn gate(result: &RunResult, fail_on_findings: bool) -> ExitIntent {
    if result.aborted {
        return ExitIntent::Aborted;
    }
    if fail_on_findings && !result.violations.is_empty() {
        ExitIntent::PolicyViolation
    } else {
        ExitIntent::Success
    }
}
