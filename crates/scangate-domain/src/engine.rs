use crate::fingerprint::fingerprint_for_violation;
use crate::policy::EffectivePolicy;
use crate::rules;
use scangate_types::{Finding, FindingValue, Violation};

/// Result of evaluating findings against a policy.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Evaluation {
    pub violations: Vec<Violation>,
    /// License ids listed as both allowed and prohibited.
    pub conflicts: Vec<String>,
}

/// Evaluate findings against a policy. Pure: no IO, deterministic output order.
pub fn evaluate(findings: &[Finding], policy: EffectivePolicy) -> Evaluation {
    let mut violations: Vec<Violation> = Vec::new();

    rules::run_all(findings, &policy, &mut violations);

    for v in &mut violations {
        v.fingerprint = Some(fingerprint_for_violation(
            &v.rule_id,
            &v.code,
            v.finding.subject.as_str(),
            value_key(&v.finding),
        ));
    }

    violations.sort_by(compare_violations);

    Evaluation {
        violations,
        conflicts: policy.conflicts(),
    }
}

fn value_key(finding: &Finding) -> &str {
    match &finding.value {
        FindingValue::License { license } => license,
        FindingValue::Vulnerability {
            vulnerability_id, ..
        } => vulnerability_id,
    }
}

fn compare_violations(a: &Violation, b: &Violation) -> std::cmp::Ordering {
    // Ordering priority:
    // 1) rule_id
    // 2) subject
    // 3) value (license or vulnerability id)
    // 4) pipeline
    a.rule_id
        .cmp(&b.rule_id)
        .then_with(|| a.finding.subject.cmp(&b.finding.subject))
        .then_with(|| value_key(&a.finding).cmp(value_key(&b.finding)))
        .then_with(|| a.finding.pipeline.cmp(&b.finding.pipeline))
}
