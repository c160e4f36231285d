use crate::{
    defaults,
    error::PolicyLoadError,
    model::{Flag, PolicyFileV1, RunConfigV1, SCHEMA_POLICY_V1},
};
use anyhow::Context;
use scangate_domain::EffectivePolicy;
use scangate_types::VulnSeverity;

/// Command-line values. They win over `scangate.toml`.
///
/// Kept as raw strings: CI actions hand every input over as text.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub policy: Option<String>,
    pub pipelines: Option<String>,
    pub output_formats: Option<String>,
    pub sbom_formats: Option<String>,
    pub generate_sbom: Option<String>,
    pub fail_on_findings: Option<String>,
    pub check_compliance: Option<String>,
    pub compliance_fail_on_vulnerabilities: Option<String>,
    pub cancel_on_failure: Option<String>,
    pub vulnerablecode_url: Option<String>,
    pub vulnerablecode_retries: Option<String>,
}

/// Fully-resolved run configuration.
///
/// Format and pipeline names are not validated here; unknown names degrade to warnings
/// at the stage that consumes them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedRunConfig {
    pub policy_path: Option<String>,
    pub pipelines: Vec<String>,
    pub output_formats: Vec<String>,
    pub sbom_formats: Vec<String>,
    pub generate_sbom: bool,
    pub fail_on_findings: bool,
    pub check_compliance: bool,
    pub compliance_fail_on_vulnerabilities: bool,
    pub cancel_on_failure: bool,
    pub vulnerablecode_url: Option<String>,
    pub vulnerablecode_retries: u32,
}

impl Default for ResolvedRunConfig {
    fn default() -> Self {
        Self {
            policy_path: None,
            pipelines: defaults::default_pipelines(),
            output_formats: defaults::default_output_formats(),
            sbom_formats: defaults::default_sbom_formats(),
            generate_sbom: defaults::DEFAULT_GENERATE_SBOM,
            fail_on_findings: defaults::DEFAULT_FAIL_ON_FINDINGS,
            check_compliance: defaults::DEFAULT_CHECK_COMPLIANCE,
            compliance_fail_on_vulnerabilities: defaults::DEFAULT_COMPLIANCE_FAIL_ON_VULNERABILITIES,
            cancel_on_failure: defaults::DEFAULT_CANCEL_ON_FAILURE,
            vulnerablecode_url: None,
            vulnerablecode_retries: defaults::DEFAULT_VULNERABLECODE_RETRIES,
        }
    }
}

pub fn resolve_run_config(
    cfg: RunConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedRunConfig> {
    let mut resolved = ResolvedRunConfig::default();

    resolved.policy_path = overrides.policy.or(cfg.policy);

    if let Some(list) = pick_list(overrides.pipelines, cfg.pipelines) {
        resolved.pipelines = list;
    }
    if let Some(list) = pick_list(overrides.output_formats, cfg.output_formats) {
        resolved.output_formats = list;
    }
    if let Some(list) = pick_list(overrides.sbom_formats, cfg.sbom_formats) {
        resolved.sbom_formats = list;
    }

    resolved.generate_sbom = pick_flag(
        "generate_sbom",
        overrides.generate_sbom,
        cfg.generate_sbom,
        resolved.generate_sbom,
    )?;
    resolved.fail_on_findings = pick_flag(
        "fail_on_findings",
        overrides.fail_on_findings,
        cfg.fail_on_findings,
        resolved.fail_on_findings,
    )?;
    resolved.check_compliance = pick_flag(
        "check_compliance",
        overrides.check_compliance,
        cfg.check_compliance,
        resolved.check_compliance,
    )?;
    resolved.compliance_fail_on_vulnerabilities = pick_flag(
        "compliance_fail_on_vulnerabilities",
        overrides.compliance_fail_on_vulnerabilities,
        cfg.compliance_fail_on_vulnerabilities,
        resolved.compliance_fail_on_vulnerabilities,
    )?;
    resolved.cancel_on_failure = pick_flag(
        "cancel_on_failure",
        overrides.cancel_on_failure,
        cfg.cancel_on_failure,
        resolved.cancel_on_failure,
    )?;

    resolved.vulnerablecode_url = overrides
        .vulnerablecode_url
        .or(cfg.vulnerablecode_url)
        .map(|u| u.trim().trim_end_matches('/').to_string())
        .filter(|u| !u.is_empty());
    match overrides.vulnerablecode_retries {
        Some(v) => {
            resolved.vulnerablecode_retries = v
                .trim()
                .parse()
                .with_context(|| format!("invalid vulnerablecode_retries '{v}'"))?;
        }
        None => {
            if let Some(retries) = cfg.vulnerablecode_retries {
                resolved.vulnerablecode_retries = retries;
            }
        }
    }

    Ok(resolved)
}

/// Turn a parsed policy document into the policy the evaluator runs against.
pub fn resolve_policy(
    doc: &PolicyFileV1,
    fail_on_any_vulnerability: bool,
) -> Result<EffectivePolicy, PolicyLoadError> {
    if let Some(schema) = doc.schema.as_deref()
        && schema != SCHEMA_POLICY_V1
    {
        return Err(PolicyLoadError::UnsupportedSchema(schema.to_string()));
    }

    let empty: &[String] = &[];
    let (allowed, prohibited) = match doc.license.as_ref() {
        Some(l) => (l.allowed.as_slice(), l.prohibited.as_slice()),
        None => (empty, empty),
    };

    // A vulnerabilities section without a threshold tolerates everything up to critical.
    let maximum_severity = match doc.vulnerabilities.as_ref() {
        None => None,
        Some(v) => match v.maximum_severity.as_deref() {
            None => Some(VulnSeverity::Critical),
            Some(label) => Some(parse_threshold(label)?),
        },
    };

    Ok(EffectivePolicy::new(allowed, prohibited, maximum_severity)
        .with_fail_on_any_vulnerability(fail_on_any_vulnerability))
}

fn parse_threshold(label: &str) -> Result<VulnSeverity, PolicyLoadError> {
    match VulnSeverity::parse_label(label) {
        Some(VulnSeverity::None) | None => Err(PolicyLoadError::UnknownSeverity(label.to_string())),
        Some(sev) => Ok(sev),
    }
}

/// Split a list input on commas and whitespace, dropping empty items.
pub fn split_list(v: &str) -> Vec<String> {
    v.split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn pick_list(over: Option<String>, cfg: Option<Vec<String>>) -> Option<Vec<String>> {
    if let Some(raw) = over {
        return Some(split_list(&raw));
    }
    cfg.map(|items| items.iter().flat_map(|s| split_list(s)).collect())
}

fn pick_flag(
    name: &str,
    over: Option<String>,
    cfg: Option<Flag>,
    default: bool,
) -> anyhow::Result<bool> {
    if let Some(raw) = over {
        return parse_flag(&raw).with_context(|| format!("invalid value for {name}"));
    }
    match cfg {
        None => Ok(default),
        Some(Flag::Bool(b)) => Ok(b),
        Some(Flag::Text(raw)) => {
            parse_flag(&raw).with_context(|| format!("invalid value for {name} in config"))
        }
    }
}

fn parse_flag(v: &str) -> anyhow::Result<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        other => anyhow::bail!("unknown boolean: {other} (expected true|false)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LicensePolicy, VulnerabilityPolicy};
    use crate::parse_run_config_toml;

    #[test]
    fn defaults_without_config() {
        let r = resolve_run_config(RunConfigV1::default(), Overrides::default()).expect("resolve");
        assert_eq!(r, ResolvedRunConfig::default());
        assert_eq!(r.pipelines, vec!["scan_codebase", "find_vulnerabilities"]);
        assert!(r.generate_sbom);
        assert!(!r.fail_on_findings);
        assert!(r.check_compliance);
        assert_eq!(r.vulnerablecode_retries, 3);
    }

    #[test]
    fn config_accepts_string_booleans() {
        let cfg = parse_run_config_toml(
            r#"
pipelines = ["scan_codebase,inspect_packages"]
fail_on_findings = "true"
check_compliance = false
sbom_formats = ["both"]
vulnerablecode_url = "https://vcio.example/"
"#,
        )
        .expect("parse");
        let r = resolve_run_config(cfg, Overrides::default()).expect("resolve");
        assert_eq!(r.pipelines, vec!["scan_codebase", "inspect_packages"]);
        assert!(r.fail_on_findings);
        assert!(!r.check_compliance);
        assert_eq!(r.sbom_formats, vec!["both"]);
        assert_eq!(r.vulnerablecode_url.as_deref(), Some("https://vcio.example"));
    }

    #[test]
    fn overrides_win_over_config() {
        let cfg = RunConfigV1 {
            fail_on_findings: Some(Flag::Bool(false)),
            output_formats: Some(vec!["json".to_string()]),
            ..RunConfigV1::default()
        };
        let overrides = Overrides {
            fail_on_findings: Some("TRUE".to_string()),
            output_formats: Some("json markdown gha".to_string()),
            ..Overrides::default()
        };
        let r = resolve_run_config(cfg, overrides).expect("resolve");
        assert!(r.fail_on_findings);
        assert_eq!(r.output_formats, vec!["json", "markdown", "gha"]);
    }

    #[test]
    fn retries_override_wins_and_is_validated() {
        let cfg = RunConfigV1 {
            vulnerablecode_retries: Some(5),
            ..RunConfigV1::default()
        };
        let r = resolve_run_config(cfg.clone(), Overrides::default()).expect("resolve");
        assert_eq!(r.vulnerablecode_retries, 5);

        let overrides = Overrides {
            vulnerablecode_retries: Some(" 0 ".to_string()),
            ..Overrides::default()
        };
        let r = resolve_run_config(cfg.clone(), overrides).expect("resolve");
        assert_eq!(r.vulnerablecode_retries, 0);

        let overrides = Overrides {
            vulnerablecode_retries: Some("-1".to_string()),
            ..Overrides::default()
        };
        let err = resolve_run_config(cfg, overrides).unwrap_err();
        assert!(format!("{err:#}").contains("vulnerablecode_retries"));
    }

    #[test]
    fn bad_boolean_is_rejected_with_key_name() {
        let overrides = Overrides {
            generate_sbom: Some("maybe".to_string()),
            ..Overrides::default()
        };
        let err = resolve_run_config(RunConfigV1::default(), overrides).unwrap_err();
        assert!(format!("{err:#}").contains("generate_sbom"));
    }

    #[test]
    fn policy_resolution_normalizes_and_parses_threshold() {
        let doc = PolicyFileV1 {
            license: Some(LicensePolicy {
                allowed: vec!["MIT".to_string()],
                prohibited: vec![" GPL-3.0 ".to_string()],
            }),
            vulnerabilities: Some(VulnerabilityPolicy {
                maximum_severity: Some("High".to_string()),
            }),
            ..PolicyFileV1::default()
        };
        let p = resolve_policy(&doc, true).expect("resolve");
        assert!(p.allowed.contains("mit"));
        assert!(p.prohibited.contains("gpl-3.0"));
        assert_eq!(p.maximum_severity, Some(VulnSeverity::High));
        assert!(p.fail_on_any_vulnerability);
    }

    #[test]
    fn vulnerabilities_section_without_threshold_allows_up_to_critical() {
        let doc = PolicyFileV1 {
            vulnerabilities: Some(VulnerabilityPolicy::default()),
            ..PolicyFileV1::default()
        };
        let p = resolve_policy(&doc, false).expect("resolve");
        assert_eq!(p.maximum_severity, Some(VulnSeverity::Critical));
        assert!(!p.exceeds_maximum(VulnSeverity::Critical));
    }

    #[test]
    fn unknown_threshold_is_a_load_error() {
        let doc = PolicyFileV1 {
            vulnerabilities: Some(VulnerabilityPolicy {
                maximum_severity: Some("severe".to_string()),
            }),
            ..PolicyFileV1::default()
        };
        let err = resolve_policy(&doc, false).unwrap_err();
        assert!(matches!(err, PolicyLoadError::UnknownSeverity(ref s) if s == "severe"));
    }

    #[test]
    fn foreign_schema_is_rejected() {
        let doc = PolicyFileV1 {
            schema: Some("other.policy.v9".to_string()),
            ..PolicyFileV1::default()
        };
        assert!(matches!(
            resolve_policy(&doc, false),
            Err(PolicyLoadError::UnsupportedSchema(_))
        ));
    }
}
