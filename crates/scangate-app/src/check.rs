//! The `check` use case: scan, generate SBOMs, evaluate policy, and produce a report.

use crate::output::{parse_output_formats, OutputFormat};
use crate::policy::load_policy;
use anyhow::Context;
use camino::Utf8Path;
use scangate_domain::RunResult;
use scangate_sbom::{SbomContext, SbomDocument};
use scangate_scan::{ScanExecutor, Scanner, VulnerabilityLookup, VulnerableCodeClient};
use scangate_settings::{Overrides, PolicyLoadError, ResolvedRunConfig, RunConfigV1};
use scangate_types::{
    ids, FindingKind, PackageRecord, RunMeta, ScanData, ScangateReport, ToolMeta, Verdict,
    VerdictCounts, Warning, SCHEMA_REPORT_V1,
};
use time::OffsetDateTime;
use tracing::{info, warn};

/// Input for the check use case.
pub struct CheckInput<'a> {
    /// Root of the scanned source tree.
    pub source: &'a Utf8Path,
    /// Run config file contents (empty string if not found).
    pub config_text: &'a str,
    /// CLI overrides.
    pub overrides: Overrides,
    /// Produces findings for each pipeline.
    pub scanner: &'a dyn Scanner,
    /// Vulnerability lookup to use instead of the configured service.
    pub lookup: Option<&'a dyn VulnerabilityLookup>,
}

/// Output from the check use case.
#[derive(Clone, Debug)]
pub struct CheckOutput {
    /// The generated report. Always populated, including on policy load failure.
    pub report: ScangateReport,
    pub run: RunResult,
    pub packages: Vec<PackageRecord>,
    pub sboms: Vec<SbomDocument>,
    pub outputs: Vec<OutputFormat>,
    /// The resolved configuration used.
    pub resolved_config: ResolvedRunConfig,
}

impl CheckOutput {
    pub fn exit_code(&self) -> i32 {
        self.run.exit_intent.code()
    }
}

/// Run the check use case.
///
/// Configuration errors fail the call. Everything after that degrades into report warnings,
/// except a policy that cannot be loaded, which aborts evaluation but still yields the
/// report with every finding gathered.
pub fn run_check(input: CheckInput<'_>) -> anyhow::Result<CheckOutput> {
    let started_at = OffsetDateTime::now_utc();

    // Parse config (empty is allowed, defaults apply).
    let cfg = if input.config_text.trim().is_empty() {
        RunConfigV1::default()
    } else {
        scangate_settings::parse_run_config_toml(input.config_text).context("parse config")?
    };
    let resolved = scangate_settings::resolve_run_config(cfg, input.overrides.clone())
        .context("resolve config")?;

    let mut warnings: Vec<Warning> = Vec::new();
    let (outputs, output_warnings) = parse_output_formats(&resolved.output_formats);

    // Scan.
    let client = match (&input.lookup, resolved.vulnerablecode_url.as_deref()) {
        (None, Some(url)) => match VulnerableCodeClient::new(url, resolved.vulnerablecode_retries) {
            Ok(c) => Some(c),
            Err(e) => {
                warnings.push(Warning::new(e.warning_code(), "vulnerablecode", e.to_string()));
                None
            }
        },
        _ => None,
    };
    let lookup = input
        .lookup
        .or(client.as_ref().map(|c| c as &dyn VulnerabilityLookup));

    let mut executor =
        ScanExecutor::new(input.scanner).cancel_on_failure(resolved.cancel_on_failure);
    if let Some(lookup) = lookup {
        executor = executor.with_lookup(lookup);
    }
    let scan = executor.execute(input.source, &resolved.pipelines);
    let partial = scan.is_partial();
    warnings.extend(scan.warnings);

    // SBOM.
    let mut sboms = Vec::new();
    if resolved.generate_sbom {
        let ctx = SbomContext {
            name: input.source.file_name().unwrap_or("scan").to_string(),
            tool_name: "scangate".to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: started_at,
        };
        let sbom_run = scangate_sbom::generate_all(&resolved.sbom_formats, &scan.packages, &ctx);
        for e in sbom_run.errors {
            warn!(error = %e, "sbom format skipped");
            warnings.push(Warning::new(ids::CODE_SBOM_FORMAT_ERROR, e.component(), e.to_string()));
        }
        sboms = sbom_run.documents;
    }

    // Policy evaluation and gate.
    let findings = scan.findings;
    let run = if resolved.check_compliance {
        let loaded = match load_policy(
            resolved.policy_path.as_deref().map(Utf8Path::new),
            resolved.compliance_fail_on_vulnerabilities,
        ) {
            Err(PolicyLoadError::NotFound(path)) => {
                warn!(path = %path, "policy file not found; evaluating without policy rules");
                warnings.push(Warning::new(
                    ids::CODE_POLICY_NOT_FOUND,
                    format!("policy:{path}"),
                    format!(
                        "policy file '{path}' does not exist; no license or severity rules applied"
                    ),
                ));
                load_policy(None, resolved.compliance_fail_on_vulnerabilities)
            }
            other => other,
        };
        match loaded {
            Ok(policy) => {
                let evaluation = scangate_domain::evaluate(&findings, policy);
                RunResult::evaluated(findings, evaluation, resolved.fail_on_findings)
            }
            Err(e) => {
                warn!(error = %e, "policy could not be loaded; evaluation skipped");
                warnings.push(Warning::new(
                    ids::CODE_POLICY_LOAD_ERROR,
                    format!("policy:{}", resolved.policy_path.as_deref().unwrap_or("")),
                    e.to_string(),
                ));
                RunResult::aborted(findings)
            }
        }
    } else {
        RunResult::unevaluated(findings)
    };

    for license in &run.conflicts {
        warnings.push(Warning::new(
            ids::CODE_POLICY_CONFLICT,
            format!("license:{license}"),
            format!("license '{license}' is both allowed and prohibited; prohibited wins"),
        ));
    }
    warnings.extend(output_warnings);

    let finished_at = OffsetDateTime::now_utc();
    let duration_ms = (finished_at - started_at).whole_milliseconds().max(0) as u64;

    let verdict = Verdict {
        status: run.verdict_status(),
        counts: VerdictCounts {
            findings: run.findings.len() as u32,
            violations: run.violations.len() as u32,
            warnings: warnings.len() as u32,
        },
        reasons: verdict_reasons(&run, resolved.fail_on_findings, partial),
    };

    info!(
        findings = run.findings.len(),
        licenses = run.findings.iter().filter(|f| f.kind() == FindingKind::License).count(),
        violations = run.violations.len(),
        warnings = warnings.len(),
        status = ?verdict.status,
        "check complete"
    );

    let report = ScangateReport {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: ToolMeta {
            name: "scangate".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        run: RunMeta {
            started_at,
            ended_at: Some(finished_at),
            duration_ms: Some(duration_ms),
        },
        verdict,
        findings: run.findings.clone(),
        violations: run.violations.clone(),
        warnings,
        artifacts: Vec::new(),
        data: ScanData {
            source: input.source.to_string(),
            policy: resolved.policy_path.clone(),
            pipelines_requested: resolved.pipelines.clone(),
            pipelines_completed: scan.completed,
            packages_scanned: scan.packages.len() as u32,
            compliance_checked: run.compliance_checked,
            enforced: resolved.fail_on_findings,
            policy_conflicts: run.conflicts.clone(),
        },
    };

    Ok(CheckOutput {
        report,
        run,
        packages: scan.packages,
        sboms,
        outputs,
        resolved_config: resolved,
    })
}

fn verdict_reasons(run: &RunResult, enforced: bool, partial: bool) -> Vec<String> {
    let mut reasons = Vec::new();
    if run.aborted {
        reasons.push(ids::REASON_POLICY_LOAD_ERROR.to_string());
    } else if !run.compliance_checked {
        reasons.push(ids::REASON_COMPLIANCE_DISABLED.to_string());
    } else if !run.violations.is_empty() {
        reasons.push(
            if enforced {
                ids::REASON_VIOLATIONS_ENFORCED
            } else {
                ids::REASON_VIOLATIONS_REPORTED
            }
            .to_string(),
        );
    }
    if partial {
        reasons.push(ids::REASON_PARTIAL_SCAN.to_string());
    }
    reasons
}
