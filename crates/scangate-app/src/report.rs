use anyhow::Context;
use scangate_render::{
    RenderableData, RenderableItem, RenderableReport, RenderableSeverity, RenderableVerdictStatus,
};
use scangate_types::{
    ids, ArtifactPointer, FindingKind, RunMeta, ScanData, ScangateReport, Subject, ToolMeta,
    Verdict, VerdictCounts, VerdictStatus, Violation, Warning, SCHEMA_REPORT_V1,
};
use time::OffsetDateTime;

pub fn parse_report_json(text: &str) -> anyhow::Result<ScangateReport> {
    let value: serde_json::Value = serde_json::from_str(text).context("parse report json")?;

    let schema = value
        .get("schema")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    if schema != SCHEMA_REPORT_V1 {
        anyhow::bail!("unknown report schema: {schema} (expected {SCHEMA_REPORT_V1})");
    }

    serde_json::from_value(value).context("parse scangate report")
}

pub fn serialize_report(report: &ScangateReport) -> anyhow::Result<Vec<u8>> {
    serde_json::to_vec_pretty(report).context("serialize report")
}

/// The findings array on its own, for the `json` output format.
pub fn serialize_findings(report: &ScangateReport) -> anyhow::Result<Vec<u8>> {
    serde_json::to_vec_pretty(&report.findings).context("serialize findings")
}

pub fn add_artifact(report: &mut ScangateReport, artifact: ArtifactPointer) {
    report.artifacts.push(artifact);
}

/// Record a warning raised after the report was built, keeping the verdict counts in step.
pub fn add_warning(report: &mut ScangateReport, warning: Warning) {
    report.warnings.push(warning);
    report.verdict.counts.warnings = report.warnings.len() as u32;
}

pub fn to_renderable(report: &ScangateReport) -> RenderableReport {
    let enforced = report.data.enforced;
    RenderableReport {
        verdict: match report.verdict.status {
            VerdictStatus::Pass => RenderableVerdictStatus::Pass,
            VerdictStatus::Warn => RenderableVerdictStatus::Warn,
            VerdictStatus::Fail => RenderableVerdictStatus::Fail,
            VerdictStatus::Skip => RenderableVerdictStatus::Skip,
        },
        violations: report
            .violations
            .iter()
            .map(|v| renderable_violation(v, enforced))
            .collect(),
        warnings: report.warnings.iter().map(renderable_warning).collect(),
        data: RenderableData {
            findings_total: report.findings.len() as u32,
            license_findings: count_kind(report, FindingKind::License),
            vulnerability_findings: count_kind(report, FindingKind::Vulnerability),
            packages_scanned: report.data.packages_scanned,
            pipelines_completed: report.data.pipelines_completed.clone(),
            enforced,
            policy_conflicts: report.data.policy_conflicts.clone(),
        },
    }
}

fn count_kind(report: &ScangateReport, kind: FindingKind) -> u32 {
    report.findings.iter().filter(|f| f.kind() == kind).count() as u32
}

fn renderable_violation(v: &Violation, enforced: bool) -> RenderableItem {
    let (path, package) = match &v.finding.subject {
        Subject::Path(p) => (Some(p.as_str().to_string()), None),
        Subject::Package(purl) => (None, Some(purl.clone())),
    };
    RenderableItem {
        severity: if enforced {
            RenderableSeverity::Error
        } else {
            RenderableSeverity::Warning
        },
        rule_id: Some(v.rule_id.clone()),
        code: v.code.clone(),
        message: v.message.clone(),
        path,
        package,
        help: Some(format!("run `scangate explain {}`", v.rule_id)),
    }
}

fn renderable_warning(w: &Warning) -> RenderableItem {
    RenderableItem {
        severity: RenderableSeverity::Warning,
        rule_id: None,
        code: w.code.clone(),
        message: w.message.clone(),
        path: None,
        package: None,
        help: None,
    }
}

/// Minimal failing report for errors that stop the run before a report exists.
pub fn runtime_error_report(source: &str, message: &str) -> ScangateReport {
    let now = OffsetDateTime::now_utc();
    ScangateReport {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: ToolMeta {
            name: "scangate".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        run: RunMeta {
            started_at: now,
            ended_at: Some(now),
            duration_ms: Some(0),
        },
        verdict: Verdict {
            status: VerdictStatus::Fail,
            counts: VerdictCounts {
                findings: 0,
                violations: 0,
                warnings: 1,
            },
            reasons: vec![ids::REASON_RUNTIME_ERROR.to_string()],
        },
        findings: Vec::new(),
        violations: Vec::new(),
        warnings: vec![Warning::new(ids::CODE_RUNTIME_ERROR, "scangate", message)],
        artifacts: Vec::new(),
        data: ScanData {
            source: source.to_string(),
            ..ScanData::default()
        },
    }
}
