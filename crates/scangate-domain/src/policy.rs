use scangate_types::{normalize_license, VulnSeverity};
use std::collections::BTreeSet;

/// Why a license breaches the policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LicenseBreach {
    /// Listed in `prohibited`. `conflict` is set when it is also listed in `allowed`.
    Prohibited { conflict: bool },
    /// The allow-list is non-empty and does not contain the license.
    NotAllowed,
}

/// Resolved, immutable policy the evaluator runs against.
///
/// License ids are stored normalized (lowercase).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EffectivePolicy {
    pub allowed: BTreeSet<String>,
    pub prohibited: BTreeSet<String>,
    /// `None` disables the severity rule.
    pub maximum_severity: Option<VulnSeverity>,
    /// Every vulnerability is a violation (`compliance_fail_on_vulnerabilities`).
    pub fail_on_any_vulnerability: bool,
}

impl EffectivePolicy {
    pub fn new<A, P>(allowed: A, prohibited: P, maximum_severity: Option<VulnSeverity>) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        Self {
            allowed: normalize_set(allowed),
            prohibited: normalize_set(prohibited),
            maximum_severity,
            fail_on_any_vulnerability: false,
        }
    }

    pub fn with_fail_on_any_vulnerability(mut self, enabled: bool) -> Self {
        self.fail_on_any_vulnerability = enabled;
        self
    }

    /// License ids listed as both allowed and prohibited.
    pub fn conflicts(&self) -> Vec<String> {
        self.allowed.intersection(&self.prohibited).cloned().collect()
    }

    pub fn has_license_rules(&self) -> bool {
        !self.allowed.is_empty() || !self.prohibited.is_empty()
    }

    /// Decide whether a license breaches the policy. Prohibited always wins.
    pub fn license_breach(&self, license: &str) -> Option<LicenseBreach> {
        let license = normalize_license(license);
        let allowed = self.allowed.contains(&license);
        if self.prohibited.contains(&license) {
            return Some(LicenseBreach::Prohibited { conflict: allowed });
        }
        if !self.allowed.is_empty() && !allowed {
            return Some(LicenseBreach::NotAllowed);
        }
        None
    }

    /// Whether `severity` ranks strictly above the configured maximum.
    pub fn exceeds_maximum(&self, severity: VulnSeverity) -> bool {
        self.maximum_severity
            .map(|max| severity.rank() > max.rank())
            .unwrap_or(false)
    }
}

fn normalize_set<I>(items: I) -> BTreeSet<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| normalize_license(s.as_ref()))
        .filter(|s| !s.is_empty())
        .collect()
}
