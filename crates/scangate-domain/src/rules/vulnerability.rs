use crate::policy::EffectivePolicy;
use scangate_types::{ids, Finding, FindingValue, Violation};

pub fn run(findings: &[Finding], policy: &EffectivePolicy, out: &mut Vec<Violation>) {
    for finding in findings {
        let FindingValue::Vulnerability {
            vulnerability_id,
            severity,
        } = &finding.value
        else {
            continue;
        };

        if policy.exceeds_maximum(*severity)
            && let Some(max) = policy.maximum_severity
        {
            out.push(Violation {
                rule_id: ids::RULE_VULNERABILITY_MAXIMUM_SEVERITY.to_string(),
                code: ids::CODE_SEVERITY_EXCEEDS_MAXIMUM.to_string(),
                message: format!(
                    "Vulnerability {} in {} has severity '{}' which exceeds allowed maximum '{}'",
                    vulnerability_id,
                    finding.subject.as_str(),
                    severity,
                    max
                ),
                finding: finding.clone(),
                conflict: false,
                fingerprint: None,
            });
            continue;
        }

        if policy.fail_on_any_vulnerability {
            out.push(Violation {
                rule_id: ids::RULE_VULNERABILITY_PRESENT.to_string(),
                code: ids::CODE_VULNERABILITY_FOUND.to_string(),
                message: format!(
                    "Vulnerability {} ({}) found in {}",
                    vulnerability_id,
                    severity,
                    finding.subject.as_str()
                ),
                finding: finding.clone(),
                conflict: false,
                fingerprint: None,
            });
        }
    }
}
