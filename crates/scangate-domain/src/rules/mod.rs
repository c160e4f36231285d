use crate::policy::EffectivePolicy;
use scangate_types::{Finding, Violation};

mod license;
mod vulnerability;

pub fn run_all(findings: &[Finding], policy: &EffectivePolicy, out: &mut Vec<Violation>) {
    license::run(findings, policy, out);
    vulnerability::run(findings, policy, out);
}
