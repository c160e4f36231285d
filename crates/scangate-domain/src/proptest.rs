//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - the license rule (prohibited, or absent from a non-empty allow-list)
//! - the severity rule (strict rank comparison)
//! - the gate mapping for both values of `fail_on_findings`

use crate::engine::evaluate;
use crate::gate::{ExitIntent, RunResult};
use crate::policy::EffectivePolicy;
use scangate_types::{Finding, Subject, VulnSeverity};
use proptest::prelude::*;
use std::collections::BTreeSet;

// ============================================================================
// Strategies for generating arbitrary values
// ============================================================================

/// A small license universe so allowed/prohibited/finding sets overlap often.
fn arb_license() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("mit".to_string()),
        Just("apache-2.0".to_string()),
        Just("gpl-3.0".to_string()),
        Just("bsd-2-clause".to_string()),
        Just("agpl-3.0".to_string()),
        Just("zlib".to_string()),
    ]
}

fn arb_license_set() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set(arb_license(), 0..4)
}

fn arb_severity() -> impl Strategy<Value = VulnSeverity> {
    prop_oneof![
        Just(VulnSeverity::None),
        Just(VulnSeverity::Low),
        Just(VulnSeverity::Medium),
        Just(VulnSeverity::High),
        Just(VulnSeverity::Critical),
    ]
}

fn arb_threshold() -> impl Strategy<Value = VulnSeverity> {
    prop_oneof![
        Just(VulnSeverity::Low),
        Just(VulnSeverity::Medium),
        Just(VulnSeverity::High),
        Just(VulnSeverity::Critical),
    ]
}

fn arb_finding() -> impl Strategy<Value = Finding> {
    prop_oneof![
        arb_license().prop_map(|l| Finding::license(Subject::path("src/lib.c"), &l)),
        (arb_severity(), 0u32..50).prop_map(|(s, n)| Finding::vulnerability(
            Subject::package(format!("pkg:npm/p{n}@1.0.0")),
            &format!("VCID-{n}"),
            s
        )),
    ]
}

proptest! {
    #[test]
    fn license_violation_iff_prohibited_or_outside_allow_list(
        allowed in arb_license_set(),
        prohibited in arb_license_set(),
        license in arb_license(),
    ) {
        let policy = EffectivePolicy::new(allowed.iter(), prohibited.iter(), None);
        let finding = Finding::license(Subject::path("a.c"), &license);
        let eval = evaluate(std::slice::from_ref(&finding), policy);

        let expected = prohibited.contains(&license)
            || (!allowed.is_empty() && !allowed.contains(&license));
        prop_assert_eq!(eval.violations.len() == 1, expected);
        prop_assert!(eval.violations.len() <= 1);
    }

    #[test]
    fn severity_violation_iff_rank_exceeds_threshold(
        severity in arb_severity(),
        threshold in arb_threshold(),
    ) {
        let policy = EffectivePolicy::new(Vec::<String>::new(), Vec::<String>::new(), Some(threshold));
        let finding = Finding::vulnerability(Subject::package("pkg:npm/x@1"), "VCID-1", severity);
        let eval = evaluate(&[finding], policy);

        prop_assert_eq!(!eval.violations.is_empty(), severity.rank() > threshold.rank());
    }

    #[test]
    fn every_violation_references_one_input_finding(
        findings in prop::collection::vec(arb_finding(), 0..20),
        allowed in arb_license_set(),
        prohibited in arb_license_set(),
        threshold in arb_threshold(),
    ) {
        let policy = EffectivePolicy::new(allowed.iter(), prohibited.iter(), Some(threshold));
        let eval = evaluate(&findings, policy);

        prop_assert!(eval.violations.len() <= findings.len());
        for v in &eval.violations {
            prop_assert!(findings.contains(&v.finding));
        }
    }

    #[test]
    fn gate_mapping_is_total(
        findings in prop::collection::vec(arb_finding(), 0..20),
        prohibited in arb_license_set(),
        threshold in arb_threshold(),
        fail_on_findings in any::<bool>(),
    ) {
        let policy = EffectivePolicy::new(Vec::<String>::new(), prohibited.iter(), Some(threshold));
        let eval = evaluate(&findings, policy);
        let has_violations = !eval.violations.is_empty();
        let result = RunResult::evaluated(findings, eval, fail_on_findings);

        prop_assert_eq!(result.passed, !has_violations);
        if fail_on_findings {
            prop_assert_eq!(result.exit_intent.code() != 0, has_violations);
        } else {
            prop_assert_eq!(result.exit_intent, ExitIntent::Success);
        }
    }
}
