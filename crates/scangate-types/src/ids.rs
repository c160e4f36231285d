//! Stable identifiers for rules, codes, pipelines and verdict reasons.
//!
//! `rule_id` is a dotted namespace. `code` is a short snake_case discriminator.

// Rules
pub const RULE_LICENSE_PROHIBITED: &str = "license.prohibited";
pub const RULE_LICENSE_NOT_ALLOWED: &str = "license.not_allowed";
pub const RULE_VULNERABILITY_MAXIMUM_SEVERITY: &str = "vulnerability.maximum_severity";
pub const RULE_VULNERABILITY_PRESENT: &str = "vulnerability.present";

// Codes: license.*
pub const CODE_PROHIBITED_LICENSE: &str = "prohibited_license";
pub const CODE_LICENSE_NOT_ALLOWED: &str = "license_not_allowed";

// Codes: vulnerability.*
pub const CODE_SEVERITY_EXCEEDS_MAXIMUM: &str = "severity_exceeds_maximum";
pub const CODE_VULNERABILITY_FOUND: &str = "vulnerability_found";

// Warning codes (run degradations, never violations)
pub const CODE_SCAN_EXECUTION_ERROR: &str = "scan_execution_error";
pub const CODE_UPSTREAM_UNAVAILABLE: &str = "upstream_unavailable";
pub const CODE_PIPELINE_CANCELLED: &str = "pipeline_cancelled";
pub const CODE_SBOM_FORMAT_ERROR: &str = "sbom_format_error";
pub const CODE_OUTPUT_FORMAT_ERROR: &str = "output_format_error";
pub const CODE_POLICY_CONFLICT: &str = "policy_conflict";
pub const CODE_POLICY_LOAD_ERROR: &str = "policy_load_error";
pub const CODE_POLICY_NOT_FOUND: &str = "policy_not_found";
pub const CODE_RUNTIME_ERROR: &str = "runtime_error";

// Pipelines
pub const PIPELINE_SCAN_CODEBASE: &str = "scan_codebase";
pub const PIPELINE_INSPECT_PACKAGES: &str = "inspect_packages";
pub const PIPELINE_FIND_VULNERABILITIES: &str = "find_vulnerabilities";

// Tools that produce findings
pub const TOOL_SCANCODE: &str = "scancode.io";
pub const TOOL_VULNERABLECODE: &str = "vulnerablecode";

// Verdict reasons
pub const REASON_VIOLATIONS_ENFORCED: &str = "violations_enforced";
pub const REASON_VIOLATIONS_REPORTED: &str = "violations_reported";
pub const REASON_COMPLIANCE_DISABLED: &str = "compliance_disabled";
pub const REASON_PARTIAL_SCAN: &str = "partial_scan";
pub const REASON_POLICY_LOAD_ERROR: &str = "policy_load_error";
pub const REASON_RUNTIME_ERROR: &str = "runtime_error";
