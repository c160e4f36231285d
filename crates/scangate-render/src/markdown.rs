use crate::{RenderableItem, RenderableReport, RenderableSeverity, RenderableVerdictStatus};

pub fn render_markdown(report: &RenderableReport) -> String {
    let mut out = String::new();

    out.push_str("# Scangate report\n\n");
    let verdict = match report.verdict {
        RenderableVerdictStatus::Pass => "PASS",
        RenderableVerdictStatus::Warn => "WARN",
        RenderableVerdictStatus::Fail => "FAIL",
        RenderableVerdictStatus::Skip => "SKIP",
    };
    let d = &report.data;
    out.push_str(&format!(
        "- Verdict: **{}**\n- Findings: {} ({} license, {} vulnerability)\n- Packages: {}\n",
        verdict, d.findings_total, d.license_findings, d.vulnerability_findings, d.packages_scanned
    ));
    if !d.pipelines_completed.is_empty() {
        out.push_str(&format!(
            "- Pipelines: {}\n",
            d.pipelines_completed
                .iter()
                .map(|p| format!("`{p}`"))
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
    out.push_str(&format!(
        "- Enforcement: {}\n\n",
        if d.enforced { "fail on violations" } else { "report only" }
    ));

    if !d.policy_conflicts.is_empty() {
        out.push_str(&format!(
            "> Note: licenses both allowed and prohibited (prohibited wins): {}\n\n",
            d.policy_conflicts.join(", ")
        ));
    }

    if report.violations.is_empty() {
        out.push_str("No violations.\n");
    } else {
        out.push_str("## Violations\n\n");
        for v in &report.violations {
            push_item(&mut out, v);
        }
    }

    if !report.warnings.is_empty() {
        out.push_str("\n## Warnings\n\n");
        for w in &report.warnings {
            push_item(&mut out, w);
        }
    }

    out
}

fn push_item(out: &mut String, item: &RenderableItem) {
    let sev = match item.severity {
        RenderableSeverity::Notice => "NOTICE",
        RenderableSeverity::Warning => "WARN",
        RenderableSeverity::Error => "ERROR",
    };
    let ident = match &item.rule_id {
        Some(rule) => format!("`{}` / `{}`", rule, item.code),
        None => format!("`{}`", item.code),
    };
    let subject = item
        .path
        .as_deref()
        .or(item.package.as_deref())
        .map(|s| format!(" (`{s}`)"))
        .unwrap_or_default();
    out.push_str(&format!("- [{}] {}: {}{}\n", sev, ident, item.message, subject));
    if let Some(help) = &item.help {
        out.push_str(&format!("  - help: {}\n", help));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RenderableData;

    #[test]
    fn renders_clean_report() {
        let report = RenderableReport {
            verdict: RenderableVerdictStatus::Pass,
            violations: Vec::new(),
            warnings: Vec::new(),
            data: RenderableData::default(),
        };
        let md = render_markdown(&report);
        assert!(md.contains("Verdict: **PASS**"));
        assert!(md.contains("No violations."));
        assert!(!md.contains("## Warnings"));
    }

    #[test]
    fn renders_violations_warnings_and_conflicts() {
        let report = RenderableReport {
            verdict: RenderableVerdictStatus::Warn,
            violations: vec![RenderableItem {
                severity: RenderableSeverity::Warning,
                rule_id: Some("vulnerability.maximum_severity".to_string()),
                code: "severity_exceeds_maximum".to_string(),
                message: "Vulnerability VCID-1 too severe".to_string(),
                path: None,
                package: Some("pkg:npm/lodash@4.17.20".to_string()),
                help: Some("upgrade".to_string()),
            }],
            warnings: vec![RenderableItem {
                severity: RenderableSeverity::Warning,
                rule_id: None,
                code: "sbom_format_error".to_string(),
                message: "unsupported SBOM format 'spdx-tv'".to_string(),
                path: None,
                package: None,
                help: None,
            }],
            data: RenderableData {
                findings_total: 3,
                license_findings: 2,
                vulnerability_findings: 1,
                packages_scanned: 1,
                pipelines_completed: vec!["scan_codebase".to_string()],
                enforced: false,
                policy_conflicts: vec!["gpl-3.0".to_string()],
            },
        };

        let md = render_markdown(&report);
        assert!(md.contains("Verdict: **WARN**"));
        assert!(md.contains("Findings: 3 (2 license, 1 vulnerability)"));
        assert!(md.contains("Pipelines: `scan_codebase`"));
        assert!(md.contains("Enforcement: report only"));
        assert!(md.contains("prohibited wins): gpl-3.0"));
        assert!(md.contains(
            "- [WARN] `vulnerability.maximum_severity` / `severity_exceeds_maximum`: Vulnerability VCID-1 too severe (`pkg:npm/lodash@4.17.20`)"
        ));
        assert!(md.contains("  - help: upgrade"));
        assert!(md.contains("## Warnings"));
        assert!(md.contains("- [WARN] `sbom_format_error`: unsupported SBOM format"));
    }
}
