use crate::policy::EffectivePolicy;
use scangate_types::{Finding, Subject, VulnSeverity};

pub fn license(path: &str, license: &str) -> Finding {
    Finding::license(Subject::path(path), license).in_pipeline("scan_codebase")
}

pub fn vuln(purl: &str, id: &str, severity: VulnSeverity) -> Finding {
    Finding::vulnerability(Subject::package(purl), id, severity).in_pipeline("find_vulnerabilities")
}

pub fn policy(
    allowed: &[&str],
    prohibited: &[&str],
    maximum_severity: Option<VulnSeverity>,
) -> EffectivePolicy {
    EffectivePolicy::new(allowed.iter(), prohibited.iter(), maximum_severity)
}
