use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const SCHEMA_POLICY_V1: &str = "scangate.policy.v1";

/// Policy document schema v1 (JSON or TOML).
///
/// This is a *user-facing* model: it is intentionally permissive so forward-compat is easy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PolicyFileV1 {
    /// Optional schema string for tooling (`scangate.policy.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<LicensePolicy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vulnerabilities: Option<VulnerabilityPolicy>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LicensePolicy {
    /// When non-empty, every detected license must be listed here.
    #[serde(default)]
    pub allowed: Vec<String>,

    /// Licenses that are always a violation.
    #[serde(default)]
    pub prohibited: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VulnerabilityPolicy {
    /// Highest acceptable severity: `low`, `medium`, `high` or `critical`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_severity: Option<String>,
}

/// A boolean input that may arrive as a real boolean or as the strings CI actions pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Text(String),
}

/// `scangate.toml` schema v1. Every key is optional; defaults apply.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RunConfigV1 {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Path to the policy document, relative to the working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,

    /// Ordered pipeline names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipelines: Option<Vec<String>>,

    /// Report outputs: `json`, `markdown`, `gha`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_formats: Option<Vec<String>>,

    /// SBOM formats: `cyclonedx`, `spdx`, `both`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sbom_formats: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_sbom: Option<Flag>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_on_findings: Option<Flag>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_compliance: Option<Flag>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance_fail_on_vulnerabilities: Option<Flag>,

    /// Skip pipelines that have not started once one fails fatally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_on_failure: Option<Flag>,

    /// Base URL of a VulnerableCode-compatible lookup service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vulnerablecode_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vulnerablecode_retries: Option<u32>,
}
