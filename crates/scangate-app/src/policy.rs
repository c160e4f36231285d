use camino::Utf8Path;
use scangate_domain::EffectivePolicy;
use scangate_settings::{parse_policy, resolve_policy, PolicyFormat, PolicyLoadError};

/// Read, parse and resolve the policy document.
///
/// No path means no license or severity rules. A path that does not exist is reported as
/// [`PolicyLoadError::NotFound`] so the caller can fall back to the empty policy with a warning;
/// every other failure is fatal to evaluation.
pub fn load_policy(
    path: Option<&Utf8Path>,
    fail_on_any_vulnerability: bool,
) -> Result<EffectivePolicy, PolicyLoadError> {
    let Some(path) = path else {
        return Ok(EffectivePolicy::default().with_fail_on_any_vulnerability(fail_on_any_vulnerability));
    };

    let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => PolicyLoadError::NotFound(path.to_string()),
        _ => PolicyLoadError::Io {
            path: path.to_string(),
            source: e,
        },
    })?;
    let doc = parse_policy(&text, PolicyFormat::from_path(path.as_str()))?;
    resolve_policy(&doc, fail_on_any_vulnerability)
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use scangate_types::VulnSeverity;

    #[test]
    fn no_path_yields_empty_policy() {
        let p = load_policy(None, true).expect("policy");
        assert!(!p.has_license_rules());
        assert!(p.fail_on_any_vulnerability);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_policy(Some(Utf8Path::new("/no/such/policy.json")), false).unwrap_err();
        assert!(matches!(err, PolicyLoadError::NotFound(_)));
    }

    #[test]
    fn reads_toml_by_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("policy.toml")).expect("utf8");
        std::fs::write(
            &path,
            "[license]\nprohibited = [\"GPL-3.0\"]\n\n[vulnerabilities]\nmaximum_severity = \"medium\"\n",
        )
        .expect("write");
        let p = load_policy(Some(&path), false).expect("policy");
        assert!(p.prohibited.contains("gpl-3.0"));
        assert_eq!(p.maximum_severity, Some(VulnSeverity::Medium));
    }
}
