use crate::Finding;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Stable schema identifier for scangate reports.
pub const SCHEMA_REPORT_V1: &str = "scangate.report.v1";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum VerdictStatus {
    Pass,
    Warn,
    Fail,
    Skip,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VerdictCounts {
    pub findings: u32,
    pub violations: u32,
    pub warnings: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Verdict {
    pub status: VerdictStatus,
    pub counts: VerdictCounts,
    #[serde(default)]
    pub reasons: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RunMeta {
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[schemars(with = "Option<String>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(with = "time::serde::rfc3339::option")]
    pub ended_at: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// A finding that breaches a policy rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Violation {
    pub rule_id: String,
    pub code: String,
    pub message: String,
    pub finding: Finding,

    /// Set when the license is both allowed and prohibited by the policy.
    #[serde(default, skip_serializing_if = "is_false")]
    pub conflict: bool,

    /// Stable identifier intended for dedup and trending. A hash of:
    /// `rule_id + code + subject + value`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

/// A degradation of the run (failed pipeline, skipped format, policy conflict).
///
/// Warnings never change the exit code on their own.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Warning {
    pub code: String,
    /// Component the warning is about, e.g. `pipeline:scan_codebase` or `sbom:spdx-tv`.
    pub component: String,
    pub message: String,
}

impl Warning {
    pub fn new(code: &str, component: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            component: component.into(),
            message: message.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactType {
    Findings,
    Markdown,
    Sbom,
}

/// Pointer to a file written alongside the report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ArtifactPointer {
    #[serde(rename = "type")]
    pub artifact_type: ArtifactType,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Scangate-specific summary payload for the report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub struct ScanData {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,

    pub pipelines_requested: Vec<String>,
    pub pipelines_completed: Vec<String>,
    pub packages_scanned: u32,

    pub compliance_checked: bool,
    /// Whether violations fail the run (`fail_on_findings`).
    pub enforced: bool,

    /// License ids present in both the allowed and prohibited lists.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub policy_conflicts: Vec<String>,
}

/// The report envelope.
///
/// Keeping this generic allows tool-specific data while still enforcing a stable outer shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportEnvelope<TData = ScanData> {
    /// Versioned schema identifier for the envelope shape.
    pub schema: String,
    pub tool: ToolMeta,
    pub run: RunMeta,
    pub verdict: Verdict,
    pub findings: Vec<Finding>,
    pub violations: Vec<Violation>,
    #[serde(default)]
    pub warnings: Vec<Warning>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<ArtifactPointer>,
    pub data: TData,
}

pub type ScangateReport = ReportEnvelope<ScanData>;

fn is_false(v: &bool) -> bool {
    !*v
}
