use crate::policy::{EffectivePolicy, LicenseBreach};
use scangate_types::{ids, Finding, Violation};

pub fn run(findings: &[Finding], policy: &EffectivePolicy, out: &mut Vec<Violation>) {
    if !policy.has_license_rules() {
        return;
    }

    for finding in findings {
        let Some(license) = finding.license_id() else { continue };
        let Some(breach) = policy.license_breach(license) else { continue };

        let violation = match breach {
            LicenseBreach::Prohibited { conflict } => Violation {
                rule_id: ids::RULE_LICENSE_PROHIBITED.to_string(),
                code: ids::CODE_PROHIBITED_LICENSE.to_string(),
                message: format!(
                    "Prohibited license '{}' found in {}",
                    license,
                    finding.subject.as_str()
                ),
                finding: finding.clone(),
                conflict,
                fingerprint: None,
            },
            LicenseBreach::NotAllowed => Violation {
                rule_id: ids::RULE_LICENSE_NOT_ALLOWED.to_string(),
                code: ids::CODE_LICENSE_NOT_ALLOWED.to_string(),
                message: format!(
                    "License '{}' found in {} is not in the allowed list",
                    license,
                    finding.subject.as_str()
                ),
                finding: finding.clone(),
                conflict: false,
                fingerprint: None,
            },
        };
        out.push(violation);
    }
}
