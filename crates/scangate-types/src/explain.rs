//! Explain registry for rules and codes.
//!
//! Maps rule IDs and codes to human-readable explanations with remediation guidance.

use crate::ids;

/// Explanation entry for a rule or code.
#[derive(Debug, Clone)]
pub struct Explanation {
    /// Short description of the rule/code.
    pub title: &'static str,
    /// What the rule does and why it exists.
    pub description: &'static str,
    /// How to resolve it.
    pub remediation: &'static str,
    /// Before/after policy examples.
    pub examples: ExamplePair,
}

/// Before and after policy examples.
#[derive(Debug, Clone)]
pub struct ExamplePair {
    /// Policy or configuration that would trigger the rule.
    pub before: &'static str,
    /// Policy or configuration that resolves it.
    pub after: &'static str,
}

/// Look up an explanation by rule_id or code.
///
/// Returns `None` if the identifier is not recognized.
pub fn lookup_explanation(identifier: &str) -> Option<Explanation> {
    match identifier {
        // Rule IDs
        ids::RULE_LICENSE_PROHIBITED => Some(explain_license_prohibited()),
        ids::RULE_LICENSE_NOT_ALLOWED => Some(explain_license_not_allowed()),
        ids::RULE_VULNERABILITY_MAXIMUM_SEVERITY => Some(explain_maximum_severity()),
        ids::RULE_VULNERABILITY_PRESENT => Some(explain_vulnerability_present()),

        // Violation codes
        ids::CODE_PROHIBITED_LICENSE => Some(explain_prohibited_license_code()),
        ids::CODE_LICENSE_NOT_ALLOWED => Some(explain_license_not_allowed_code()),
        ids::CODE_SEVERITY_EXCEEDS_MAXIMUM => Some(explain_severity_exceeds_code()),
        ids::CODE_VULNERABILITY_FOUND => Some(explain_vulnerability_found_code()),

        // Warning codes
        ids::CODE_POLICY_CONFLICT => Some(explain_policy_conflict()),
        ids::CODE_SBOM_FORMAT_ERROR => Some(explain_sbom_format_error()),
        ids::CODE_SCAN_EXECUTION_ERROR => Some(explain_scan_execution_error()),
        ids::CODE_UPSTREAM_UNAVAILABLE => Some(explain_upstream_unavailable()),
        ids::CODE_POLICY_LOAD_ERROR => Some(explain_policy_load_error()),
        ids::CODE_POLICY_NOT_FOUND => Some(explain_policy_not_found()),
        ids::CODE_PIPELINE_CANCELLED => Some(explain_pipeline_cancelled()),
        ids::CODE_OUTPUT_FORMAT_ERROR => Some(explain_output_format_error()),
        ids::CODE_RUNTIME_ERROR => Some(explain_runtime_error()),

        _ => None,
    }
}

/// List all known rule IDs.
pub fn all_rule_ids() -> &'static [&'static str] {
    &[
        ids::RULE_LICENSE_PROHIBITED,
        ids::RULE_LICENSE_NOT_ALLOWED,
        ids::RULE_VULNERABILITY_MAXIMUM_SEVERITY,
        ids::RULE_VULNERABILITY_PRESENT,
    ]
}

/// List all known codes.
pub fn all_codes() -> &'static [&'static str] {
    &[
        ids::CODE_PROHIBITED_LICENSE,
        ids::CODE_LICENSE_NOT_ALLOWED,
        ids::CODE_SEVERITY_EXCEEDS_MAXIMUM,
        ids::CODE_VULNERABILITY_FOUND,
        ids::CODE_POLICY_CONFLICT,
        ids::CODE_SBOM_FORMAT_ERROR,
        ids::CODE_SCAN_EXECUTION_ERROR,
        ids::CODE_UPSTREAM_UNAVAILABLE,
        ids::CODE_POLICY_LOAD_ERROR,
        ids::CODE_POLICY_NOT_FOUND,
        ids::CODE_PIPELINE_CANCELLED,
        ids::CODE_OUTPUT_FORMAT_ERROR,
        ids::CODE_RUNTIME_ERROR,
    ]
}

// --- Rule-level explanations ---

fn explain_license_prohibited() -> Explanation {
    Explanation {
        title: "Prohibited License",
        description: "\
Flags any detected license that appears in the policy's `license.prohibited` list.

A prohibited license is an explicit deny. It always wins, even when the same
license is also listed in `license.allowed`; that combination is reported as a
policy-authoring conflict so the policy owner can decide which list is wrong.",
        remediation: "\
Remove or replace the component carrying the prohibited license, or, if the
license is acceptable after review, drop it from `license.prohibited`.",
        examples: ExamplePair {
            before: r#"{
  "license": { "prohibited": ["gpl-3.0"] }
}
// scan detected: src/vendor/readline.c -> gpl-3.0"#,
            after: r#"{
  "license": { "prohibited": ["gpl-3.0"] }
}
// vendored readline replaced with an mit-licensed line editor"#,
        },
    }
}

fn explain_license_not_allowed() -> Explanation {
    Explanation {
        title: "License Not In Allow-List",
        description: "\
Flags any detected license that is absent from a non-empty `license.allowed` list.

An empty or missing allow-list means \"no allow-list restriction\": only the
prohibited list is enforced.",
        remediation: "\
Add the license to `license.allowed` after legal review, or remove the component.",
        examples: ExamplePair {
            before: r#"{
  "license": { "allowed": ["apache-2.0", "mit"] }
}
// scan detected: pkg:pypi/attrs@23.1.0 -> bsd-new"#,
            after: r#"{
  "license": { "allowed": ["apache-2.0", "mit", "bsd-new"] }
}"#,
        },
    }
}

fn explain_maximum_severity() -> Explanation {
    Explanation {
        title: "Vulnerability Exceeds Maximum Severity",
        description: "\
Flags vulnerabilities whose severity ranks above `vulnerabilities.maximum_severity`
on the scale low < medium < high < critical.

Vulnerabilities with an unknown severity rank below `low` and never exceed a threshold.",
        remediation: "\
Upgrade the affected package to a fixed version, or raise the threshold if the
risk has been accepted.",
        examples: ExamplePair {
            before: r#"{
  "vulnerabilities": { "maximum_severity": "high" }
}
// pkg:npm/lodash@4.17.15 affected by VCID-xxxx (critical)"#,
            after: r#"// pkg:npm/lodash@4.17.21 (fixed), no critical vulnerabilities remain"#,
        },
    }
}

fn explain_vulnerability_present() -> Explanation {
    Explanation {
        title: "Vulnerability Present",
        description: "\
With `compliance_fail_on_vulnerabilities` enabled, every detected vulnerability is a
violation regardless of its severity.",
        remediation: "\
Upgrade or remove the affected packages, or disable
`compliance_fail_on_vulnerabilities` and rely on `maximum_severity` instead.",
        examples: ExamplePair {
            before: r#"# scangate.toml
compliance_fail_on_vulnerabilities = true"#,
            after: r#"# scangate.toml
compliance_fail_on_vulnerabilities = false
# and in the policy:
# { "vulnerabilities": { "maximum_severity": "medium" } }"#,
        },
    }
}

// --- Code-level explanations ---

fn explain_prohibited_license_code() -> Explanation {
    let mut exp = explain_license_prohibited();
    exp.title = "Prohibited License Detected";
    exp
}

fn explain_license_not_allowed_code() -> Explanation {
    let mut exp = explain_license_not_allowed();
    exp.title = "License Not Allowed";
    exp
}

fn explain_severity_exceeds_code() -> Explanation {
    let mut exp = explain_maximum_severity();
    exp.title = "Severity Exceeds Maximum";
    exp
}

fn explain_vulnerability_found_code() -> Explanation {
    let mut exp = explain_vulnerability_present();
    exp.title = "Vulnerability Found";
    exp
}

fn explain_policy_conflict() -> Explanation {
    Explanation {
        title: "Policy Authoring Conflict",
        description: "\
A license id appears in both `license.allowed` and `license.prohibited`.

The prohibited entry wins, so findings for that license are violations. The
conflict is reported so the intent can be clarified.",
        remediation: "Remove the license from one of the two lists.",
        examples: ExamplePair {
            before: r#"{
  "license": { "allowed": ["mit", "gpl-3.0"], "prohibited": ["gpl-3.0"] }
}"#,
            after: r#"{
  "license": { "allowed": ["mit"], "prohibited": ["gpl-3.0"] }
}"#,
        },
    }
}

fn explain_sbom_format_error() -> Explanation {
    Explanation {
        title: "Unsupported SBOM Format",
        description: "\
A requested SBOM format is not supported. The format is skipped; other formats are
still generated and the exit code is unaffected.

Supported: `cyclonedx` (`cyclonedx-json`), `spdx` (`spdx-json`), and `both`.",
        remediation: "Fix the format name in `sbom_formats` or `--sbom-format`.",
        examples: ExamplePair {
            before: r#"sbom_formats = ["cyclonedx", "spdx-tv"]"#,
            after: r#"sbom_formats = ["cyclonedx", "spdx"]"#,
        },
    }
}

fn explain_scan_execution_error() -> Explanation {
    Explanation {
        title: "Scan Pipeline Failed",
        description: "\
A pipeline could not run: the name is unknown, the source tree is unreadable, or the
scan results could not be read. Findings from other pipelines are still reported.

Known pipelines: `scan_codebase`, `inspect_packages`, `find_vulnerabilities`.",
        remediation: "Check the pipeline names and the `--source` / `--input` paths.",
        examples: ExamplePair {
            before: r#"pipelines = ["scan_codebase", "scan_everything"]"#,
            after: r#"pipelines = ["scan_codebase", "find_vulnerabilities"]"#,
        },
    }
}

fn explain_upstream_unavailable() -> Explanation {
    Explanation {
        title: "Vulnerability Service Unavailable",
        description: "\
The vulnerability lookup service could not be reached after all retries. The run
continues without lookup results.",
        remediation: "\
Check `vulnerablecode_url` and network access from the runner, or raise
`vulnerablecode_retries`.",
        examples: ExamplePair {
            before: r#"vulnerablecode_url = "http://localhost:9999""#,
            after: r#"vulnerablecode_url = "https://public.vulnerablecode.io""#,
        },
    }
}

fn explain_policy_load_error() -> Explanation {
    Explanation {
        title: "Policy Could Not Be Loaded",
        description: "\
The policy file exists but cannot be read, is malformed, or uses an unknown severity.
Evaluation cannot proceed, so the run aborts after persisting the findings gathered so far.",
        remediation: "Fix the policy document; `maximum_severity` must be one of low, medium, high, critical.",
        examples: ExamplePair {
            before: r#"{ "vulnerabilities": { "maximum_severity": "severe" } }"#,
            after: r#"{ "vulnerabilities": { "maximum_severity": "high" } }"#,
        },
    }
}

fn explain_policy_not_found() -> Explanation {
    Explanation {
        title: "Policy File Not Found",
        description: "\
The configured policy path does not exist. The run continues as if no policy were
configured: no license or severity rules apply, so only `compliance_fail_on_vulnerabilities`
can produce violations.",
        remediation: "Point `policy` at an existing JSON or TOML policy, or drop the setting.",
        examples: ExamplePair {
            before: r#"policy = "compliance/polcy.json""#,
            after: r#"policy = "compliance/policy.json""#,
        },
    }
}

fn explain_pipeline_cancelled() -> Explanation {
    Explanation {
        title: "Pipeline Cancelled",
        description: "\
With `cancel_on_failure` enabled, pipelines that had not started when another pipeline
failed are skipped. Pipelines already running finish normally.",
        remediation: "Fix the failing pipeline, or disable `cancel_on_failure` to always run every pipeline.",
        examples: ExamplePair {
            before: r#"cancel_on_failure = true
pipelines = ["scan_everything", "scan_codebase"]"#,
            after: r#"cancel_on_failure = true
pipelines = ["scan_codebase"]"#,
        },
    }
}

fn explain_output_format_error() -> Explanation {
    Explanation {
        title: "Unknown Output Format",
        description: "\
A requested report output is not known and was skipped. `report.json` is always written.

Known outputs: `json` (findings.json), `markdown` (comment.md), `gha` (annotations).",
        remediation: "Fix the name in `output_formats` or `--output-formats`.",
        examples: ExamplePair {
            before: r#"output_formats = ["json", "sarif"]"#,
            after: r#"output_formats = ["json", "markdown"]"#,
        },
    }
}

fn explain_runtime_error() -> Explanation {
    Explanation {
        title: "Runtime Error",
        description: "\
The run stopped before a scan could start, usually because the run configuration is
invalid or an output file could not be written.",
        remediation: "Read the message in the report, fix the configuration or paths, and re-run.",
        examples: ExamplePair {
            before: r#"fail_on_findings = "sometimes""#,
            after: r#"fail_on_findings = true"#,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_rule_id() {
        assert!(lookup_explanation(ids::RULE_LICENSE_PROHIBITED).is_some());
        assert!(lookup_explanation(ids::RULE_LICENSE_NOT_ALLOWED).is_some());
        assert!(lookup_explanation(ids::RULE_VULNERABILITY_MAXIMUM_SEVERITY).is_some());
        assert!(lookup_explanation(ids::RULE_VULNERABILITY_PRESENT).is_some());
    }

    #[test]
    fn lookup_unknown_returns_none() {
        assert!(lookup_explanation("unknown.rule").is_none());
        assert!(lookup_explanation("unknown_code").is_none());
    }

    #[test]
    fn all_rule_ids_are_valid() {
        for id in all_rule_ids() {
            assert!(
                lookup_explanation(id).is_some(),
                "rule_id {} should be in registry",
                id
            );
        }
    }

    #[test]
    fn all_codes_are_valid() {
        for code in all_codes() {
            assert!(
                lookup_explanation(code).is_some(),
                "code {} should be in registry",
                code
            );
        }
    }
}
