use scangate_types::ids;

/// Defaults applied when neither `scangate.toml` nor the command line sets a key.
///
/// These mirror the inputs of the CI action the tool is driven from.
pub fn default_pipelines() -> Vec<String> {
    vec![
        ids::PIPELINE_SCAN_CODEBASE.to_string(),
        ids::PIPELINE_FIND_VULNERABILITIES.to_string(),
    ]
}

pub fn default_output_formats() -> Vec<String> {
    vec!["json".to_string()]
}

pub fn default_sbom_formats() -> Vec<String> {
    vec!["cyclonedx".to_string(), "spdx".to_string()]
}

pub const DEFAULT_GENERATE_SBOM: bool = true;
pub const DEFAULT_FAIL_ON_FINDINGS: bool = false;
pub const DEFAULT_CHECK_COMPLIANCE: bool = true;
pub const DEFAULT_COMPLIANCE_FAIL_ON_VULNERABILITIES: bool = false;
pub const DEFAULT_CANCEL_ON_FAILURE: bool = false;
pub const DEFAULT_VULNERABLECODE_RETRIES: u32 = 3;
