//! Policy and run configuration parsing and resolution.
//!
//! This crate is intentionally IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod defaults;
mod error;
mod model;
mod resolve;

pub use error::PolicyLoadError;
pub use model::{
    Flag, LicensePolicy, PolicyFileV1, RunConfigV1, VulnerabilityPolicy, SCHEMA_POLICY_V1,
};
pub use resolve::{resolve_policy, resolve_run_config, split_list, Overrides, ResolvedRunConfig};

use anyhow::Context;

/// Serialization of a policy document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyFormat {
    Json,
    Toml,
}

impl PolicyFormat {
    /// Pick the format from a file name extension. `None` means "sniff".
    pub fn from_path(path: &str) -> Option<Self> {
        let lower = path.to_ascii_lowercase();
        if lower.ends_with(".json") {
            Some(PolicyFormat::Json)
        } else if lower.ends_with(".toml") {
            Some(PolicyFormat::Toml)
        } else {
            None
        }
    }

    fn name(self) -> &'static str {
        match self {
            PolicyFormat::Json => "json",
            PolicyFormat::Toml => "toml",
        }
    }
}

/// Parse a policy document. With no explicit format, JSON is tried first, then TOML.
pub fn parse_policy(
    input: &str,
    format: Option<PolicyFormat>,
) -> Result<PolicyFileV1, PolicyLoadError> {
    match format {
        Some(f) => parse_policy_as(input, f),
        None => sniff_policy(input),
    }
}

fn sniff_policy(input: &str) -> Result<PolicyFileV1, PolicyLoadError> {
    let json = match serde_json::from_str(input) {
        Ok(doc) => return Ok(doc),
        Err(e) => e.to_string(),
    };
    toml::from_str(input).map_err(|e| PolicyLoadError::Unrecognized {
        json,
        toml: e.to_string(),
    })
}

fn parse_policy_as(input: &str, format: PolicyFormat) -> Result<PolicyFileV1, PolicyLoadError> {
    let parsed = match format {
        PolicyFormat::Json => serde_json::from_str(input).map_err(|e| e.to_string()),
        PolicyFormat::Toml => toml::from_str(input).map_err(|e| e.to_string()),
    };
    parsed.map_err(|message| PolicyLoadError::Parse {
        format: format.name(),
        message,
    })
}

/// Parse `scangate.toml` into a typed model.
pub fn parse_run_config_toml(input: &str) -> anyhow::Result<RunConfigV1> {
    let cfg: RunConfigV1 = toml::from_str(input).context("parse run config toml")?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_policy_like_the_action_ships_it() {
        let doc = parse_policy(
            r#"{
  "license": { "allowed": ["apache-2.0", "mit"], "prohibited": ["gpl-3.0"] },
  "vulnerabilities": { "maximum_severity": "high" }
}"#,
            Some(PolicyFormat::Json),
        )
        .expect("parse json");
        let license = doc.license.expect("license section");
        assert_eq!(license.allowed, vec!["apache-2.0", "mit"]);
        assert_eq!(license.prohibited, vec!["gpl-3.0"]);
        assert_eq!(
            doc.vulnerabilities.and_then(|v| v.maximum_severity).as_deref(),
            Some("high")
        );
    }

    #[test]
    fn sniffs_toml_when_format_is_unknown() {
        let doc = parse_policy(
            r#"
[license]
prohibited = ["agpl-3.0"]

[vulnerabilities]
maximum_severity = "medium"
"#,
            None,
        )
        .expect("parse toml");
        assert_eq!(doc.license.expect("license").prohibited, vec!["agpl-3.0"]);
    }

    #[test]
    fn malformed_policy_is_a_load_error() {
        let err = parse_policy("{ \"license\": [", Some(PolicyFormat::Json)).unwrap_err();
        assert!(matches!(err, PolicyLoadError::Parse { format: "json", .. }));
    }

    #[test]
    fn sniffing_failure_reports_both_parsers() {
        let err = parse_policy("{ \"license\": { \"allowed\": [\"mit\" }", None).unwrap_err();
        let PolicyLoadError::Unrecognized { json, toml } = &err else {
            panic!("expected Unrecognized, got {err:?}");
        };
        assert!(!json.is_empty());
        assert!(!toml.is_empty());
        let message = err.to_string();
        assert!(message.contains("valid JSON"), "{message}");
        assert!(message.contains("valid TOML"), "{message}");
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(PolicyFormat::from_path("policy.JSON"), Some(PolicyFormat::Json));
        assert_eq!(PolicyFormat::from_path("p/policy.toml"), Some(PolicyFormat::Toml));
        assert_eq!(PolicyFormat::from_path("policy.yml"), None);
    }
}
