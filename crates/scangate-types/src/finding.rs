//! Findings and the package inventory produced by scan pipelines.

use crate::{ids, RepoPath};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Vulnerability severity on the ordinal scale `none < low < medium < high < critical`.
///
/// Declaration order is the rank order; `Ord` is derived from it.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum VulnSeverity {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl VulnSeverity {
    pub fn rank(self) -> u8 {
        match self {
            VulnSeverity::None => 0,
            VulnSeverity::Low => 1,
            VulnSeverity::Medium => 2,
            VulnSeverity::High => 3,
            VulnSeverity::Critical => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VulnSeverity::None => "none",
            VulnSeverity::Low => "low",
            VulnSeverity::Medium => "medium",
            VulnSeverity::High => "high",
            VulnSeverity::Critical => "critical",
        }
    }

    /// Parse a severity label (case-insensitive). Returns `None` for unrecognized labels.
    pub fn parse_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "none" => Some(VulnSeverity::None),
            "low" => Some(VulnSeverity::Low),
            "medium" | "moderate" => Some(VulnSeverity::Medium),
            "high" | "important" => Some(VulnSeverity::High),
            "critical" => Some(VulnSeverity::Critical),
            _ => None,
        }
    }

    /// Severity as reported by an upstream source. Unknown labels rank as `none`.
    pub fn from_label_lossy(label: &str) -> Self {
        Self::parse_label(label).unwrap_or(VulnSeverity::None)
    }

    /// Map a CVSS-like 0..10 risk score onto the label scale.
    pub fn from_risk_score(score: f64) -> Self {
        if score >= 9.0 {
            VulnSeverity::Critical
        } else if score >= 7.0 {
            VulnSeverity::High
        } else if score >= 4.0 {
            VulnSeverity::Medium
        } else if score > 0.0 {
            VulnSeverity::Low
        } else {
            VulnSeverity::None
        }
    }
}

impl std::fmt::Display for VulnSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a finding is about: a file in the scanned tree or a package.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Path(RepoPath),
    /// Package URL (purl).
    Package(String),
}

impl Subject {
    pub fn path(p: impl AsRef<str>) -> Self {
        Subject::Path(RepoPath::new(p))
    }

    pub fn package(purl: impl Into<String>) -> Self {
        Subject::Package(purl.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Subject::Path(p) => p.as_str(),
            Subject::Package(purl) => purl.as_str(),
        }
    }

    pub fn as_package(&self) -> Option<&str> {
        match self {
            Subject::Package(purl) => Some(purl.as_str()),
            Subject::Path(_) => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FindingKind {
    License,
    Vulnerability,
}

/// The detected fact itself. Serialized with a `kind` tag next to the finding fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FindingValue {
    License {
        /// Normalized (lowercase) license key or expression.
        license: String,
    },
    Vulnerability {
        vulnerability_id: String,
        severity: VulnSeverity,
    },
}

/// One detected fact. Immutable once produced by a pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Finding {
    pub subject: Subject,
    #[serde(flatten)]
    pub value: FindingValue,
    /// Tool that produced the fact (e.g. `scancode.io`).
    pub tool: String,
    /// Pipeline the finding originated from.
    pub pipeline: String,
    /// Detection score in `0..=100`, when the tool reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl Finding {
    pub fn license(subject: Subject, license: &str) -> Self {
        Self {
            subject,
            value: FindingValue::License {
                license: normalize_license(license),
            },
            tool: ids::TOOL_SCANCODE.to_string(),
            pipeline: String::new(),
            confidence: None,
        }
    }

    pub fn vulnerability(subject: Subject, vulnerability_id: &str, severity: VulnSeverity) -> Self {
        Self {
            subject,
            value: FindingValue::Vulnerability {
                vulnerability_id: vulnerability_id.trim().to_string(),
                severity,
            },
            tool: ids::TOOL_SCANCODE.to_string(),
            pipeline: String::new(),
            confidence: None,
        }
    }

    pub fn in_pipeline(mut self, pipeline: &str) -> Self {
        self.pipeline = pipeline.to_string();
        self
    }

    pub fn from_tool(mut self, tool: &str) -> Self {
        self.tool = tool.to_string();
        self
    }

    pub fn with_confidence(mut self, confidence: Option<f64>) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn kind(&self) -> FindingKind {
        match self.value {
            FindingValue::License { .. } => FindingKind::License,
            FindingValue::Vulnerability { .. } => FindingKind::Vulnerability,
        }
    }

    pub fn license_id(&self) -> Option<&str> {
        match &self.value {
            FindingValue::License { license } => Some(license.as_str()),
            FindingValue::Vulnerability { .. } => None,
        }
    }

    /// Short `kind:value` label used in messages and renderers.
    pub fn label(&self) -> String {
        match &self.value {
            FindingValue::License { license } => format!("license:{license}"),
            FindingValue::Vulnerability {
                vulnerability_id,
                severity,
            } => format!("vuln:{vulnerability_id} ({severity})"),
        }
    }
}

/// Canonical form of a license key: trimmed and lowercased.
pub fn normalize_license(license: &str) -> String {
    license.trim().to_ascii_lowercase()
}

/// One package from the scanned inventory. Input to SBOM generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PackageRecord {
    pub purl: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub package_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// License keys/expressions attributed to this package.
    #[serde(default)]
    pub licenses: BTreeSet<String>,
    /// Vulnerability findings whose subject is this package.
    #[serde(default)]
    pub vulnerabilities: Vec<Finding>,
}

impl PackageRecord {
    pub fn new(purl: impl Into<String>, name: impl Into<String>, version: Option<String>) -> Self {
        Self {
            purl: purl.into(),
            package_type: None,
            namespace: None,
            name: name.into(),
            version,
            licenses: BTreeSet::new(),
            vulnerabilities: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_rank_follows_declaration_order() {
        assert!(VulnSeverity::None < VulnSeverity::Low);
        assert!(VulnSeverity::Low < VulnSeverity::Medium);
        assert!(VulnSeverity::High < VulnSeverity::Critical);
        assert_eq!(VulnSeverity::Critical.rank(), 4);
    }

    #[test]
    fn severity_labels_are_lenient() {
        assert_eq!(VulnSeverity::parse_label("HIGH"), Some(VulnSeverity::High));
        assert_eq!(VulnSeverity::parse_label("moderate"), Some(VulnSeverity::Medium));
        assert_eq!(VulnSeverity::parse_label("unknown"), None);
        assert_eq!(VulnSeverity::from_label_lossy("unknown"), VulnSeverity::None);
    }

    #[test]
    fn risk_score_buckets() {
        assert_eq!(VulnSeverity::from_risk_score(9.8), VulnSeverity::Critical);
        assert_eq!(VulnSeverity::from_risk_score(7.0), VulnSeverity::High);
        assert_eq!(VulnSeverity::from_risk_score(4.2), VulnSeverity::Medium);
        assert_eq!(VulnSeverity::from_risk_score(0.1), VulnSeverity::Low);
        assert_eq!(VulnSeverity::from_risk_score(0.0), VulnSeverity::None);
    }

    #[test]
    fn finding_serializes_with_kind_tag() {
        let f = Finding::license(Subject::path("src/a.c"), " MIT ").in_pipeline("scan_codebase");
        let v = serde_json::to_value(&f).expect("serialize");
        assert_eq!(v["kind"], "license");
        assert_eq!(v["license"], "mit");
        assert_eq!(v["subject"]["path"], "src/a.c");
        assert_eq!(v["pipeline"], "scan_codebase");
        assert!(v.get("confidence").is_none());

        let back: Finding = serde_json::from_value(v).expect("deserialize");
        assert_eq!(back, f);
    }

    #[test]
    fn vulnerability_label() {
        let f = Finding::vulnerability(
            Subject::package("pkg:npm/lodash@4.17.20"),
            "VCID-1",
            VulnSeverity::High,
        );
        assert_eq!(f.kind(), FindingKind::Vulnerability);
        assert_eq!(f.label(), "vuln:VCID-1 (high)");
        assert!(f.license_id().is_none());
    }
}
