use crate::{Pipeline, PipelineOutput, ScanError, Scanner, VulnerabilityLookup};
use camino::Utf8Path;
use rayon::prelude::*;
use scangate_types::{ids, Finding, FindingValue, PackageRecord, Subject, Warning};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

/// Merged result of every requested pipeline.
#[derive(Clone, Debug, Default)]
pub struct ScanOutcome {
    /// Findings in requested pipeline order, each tagged with its pipeline.
    pub findings: Vec<Finding>,
    /// Package inventory merged by purl, sorted by purl.
    pub packages: Vec<PackageRecord>,
    pub completed: Vec<String>,
    pub failed: Vec<String>,
    pub warnings: Vec<Warning>,
}

impl ScanOutcome {
    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty() || !self.warnings.is_empty()
    }
}

enum Outcome {
    Completed {
        output: PipelineOutput,
        degraded: Option<ScanError>,
    },
    Failed(ScanError),
    Cancelled,
}

/// Runs pipelines concurrently and merges their output.
pub struct ScanExecutor<'a> {
    scanner: &'a dyn Scanner,
    lookup: Option<&'a dyn VulnerabilityLookup>,
    cancel_on_failure: bool,
}

impl<'a> ScanExecutor<'a> {
    pub fn new(scanner: &'a dyn Scanner) -> Self {
        Self {
            scanner,
            lookup: None,
            cancel_on_failure: false,
        }
    }

    /// Union `find_vulnerabilities` with lookups against an external service.
    pub fn with_lookup(mut self, lookup: &'a dyn VulnerabilityLookup) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Skip pipelines that have not started once one fails fatally.
    pub fn cancel_on_failure(mut self, enabled: bool) -> Self {
        self.cancel_on_failure = enabled;
        self
    }

    pub fn execute(&self, source: &Utf8Path, pipelines: &[String]) -> ScanOutcome {
        let source_error = check_source(source).err();
        let failed_fatally = AtomicBool::new(false);

        let outcomes: Vec<(String, Outcome)> = pipelines
            .par_iter()
            .map(|name| {
                let name = name.trim().to_string();
                if self.cancel_on_failure && failed_fatally.load(Ordering::SeqCst) {
                    return (name, Outcome::Cancelled);
                }
                let outcome = match &source_error {
                    Some(e) => Outcome::Failed(e.clone()),
                    None => self.run_one(&name, source),
                };
                if let Outcome::Failed(e) = &outcome
                    && e.is_fatal()
                {
                    failed_fatally.store(true, Ordering::SeqCst);
                }
                (name, outcome)
            })
            .collect();

        let mut merged = ScanOutcome::default();
        let mut packages = Vec::new();
        for (name, outcome) in outcomes {
            let component = format!("pipeline:{name}");
            match outcome {
                Outcome::Completed { output, degraded } => {
                    info!(
                        pipeline = %name,
                        findings = output.findings.len(),
                        packages = output.packages.len(),
                        "pipeline completed"
                    );
                    if let Some(e) = degraded {
                        merged
                            .warnings
                            .push(Warning::new(e.warning_code(), &component, e.to_string()));
                    }
                    merged
                        .findings
                        .extend(output.findings.into_iter().map(|f| f.in_pipeline(&name)));
                    packages.extend(output.packages);
                    merged.completed.push(name);
                }
                Outcome::Failed(e) => {
                    warn!(pipeline = %name, error = %e, "pipeline failed");
                    merged
                        .warnings
                        .push(Warning::new(e.warning_code(), &component, e.to_string()));
                    merged.failed.push(name);
                }
                Outcome::Cancelled => {
                    warn!(pipeline = %name, "pipeline cancelled after an earlier failure");
                    merged.warnings.push(Warning::new(
                        ids::CODE_PIPELINE_CANCELLED,
                        &component,
                        format!("pipeline {name} was not started because another pipeline failed"),
                    ));
                }
            }
        }

        merged.packages = assemble_packages(packages, &merged.findings);
        merged
    }

    fn run_one(&self, name: &str, source: &Utf8Path) -> Outcome {
        let pipeline = match Pipeline::parse(name) {
            Ok(p) => p,
            Err(e) => return Outcome::Failed(e),
        };
        let mut output = match self.scanner.run_pipeline(pipeline, source) {
            Ok(o) => o,
            Err(e) => return Outcome::Failed(e),
        };

        let mut degraded = None;
        if pipeline == Pipeline::FindVulnerabilities
            && let Some(lookup) = self.lookup
        {
            let purls: Vec<String> = output
                .packages
                .iter()
                .filter(|p| p.version.is_some())
                .map(|p| p.purl.clone())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            match lookup.lookup(&purls) {
                Ok(found) => {
                    output.findings.extend(found.findings);
                    degraded = found.degraded;
                }
                Err(e) if !e.is_fatal() => degraded = Some(e),
                Err(e) => return Outcome::Failed(e),
            }
            dedup_vulnerabilities(&mut output.findings);
        }

        Outcome::Completed { output, degraded }
    }
}

fn check_source(source: &Utf8Path) -> Result<(), ScanError> {
    std::fs::read_dir(source)
        .map(|_| ())
        .map_err(|e| ScanError::SourceUnreadable {
            path: source.to_string(),
            message: e.to_string(),
        })
}

/// Keep the first finding per (subject, vulnerability id).
fn dedup_vulnerabilities(findings: &mut Vec<Finding>) {
    let mut seen = BTreeSet::new();
    findings.retain(|f| match &f.value {
        FindingValue::Vulnerability {
            vulnerability_id, ..
        } => seen.insert((f.subject.clone(), vulnerability_id.clone())),
        FindingValue::License { .. } => true,
    });
}

/// Merge package records by purl and attach package-subject findings to them.
///
/// The first record for a purl supplies its metadata. Findings about unknown purls are
/// left unattached.
pub fn assemble_packages(packages: Vec<PackageRecord>, findings: &[Finding]) -> Vec<PackageRecord> {
    let mut by_purl: BTreeMap<String, PackageRecord> = BTreeMap::new();
    for p in packages {
        match by_purl.get_mut(&p.purl) {
            Some(existing) => existing.licenses.extend(p.licenses),
            None => {
                by_purl.insert(p.purl.clone(), p);
            }
        }
    }

    for f in findings {
        let Subject::Package(purl) = &f.subject else {
            continue;
        };
        let Some(pkg) = by_purl.get_mut(purl) else {
            continue;
        };
        match &f.value {
            FindingValue::License { license } => {
                pkg.licenses.insert(license.clone());
            }
            FindingValue::Vulnerability {
                vulnerability_id, ..
            } => {
                let known = pkg.vulnerabilities.iter().any(|v| {
                    matches!(&v.value, FindingValue::Vulnerability { vulnerability_id: id, .. } if id == vulnerability_id)
                });
                if !known {
                    pkg.vulnerabilities.push(f.clone());
                }
            }
        }
    }

    by_purl.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeLookup, FakeScanner};
    use scangate_types::VulnSeverity;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn source() -> tempfile::TempDir {
        tempfile::tempdir().expect("tempdir")
    }

    fn utf8(dir: &tempfile::TempDir) -> &Utf8Path {
        Utf8Path::from_path(dir.path()).expect("utf8 tempdir")
    }

    fn lodash() -> PackageRecord {
        PackageRecord::new(
            "pkg:npm/lodash@4.17.20",
            "lodash",
            Some("4.17.20".to_string()),
        )
    }

    #[test]
    fn findings_keep_requested_order_and_are_tagged() {
        let scanner = FakeScanner::new()
            .with_output(
                Pipeline::FindVulnerabilities,
                PipelineOutput {
                    findings: vec![Finding::vulnerability(
                        Subject::package("pkg:npm/lodash@4.17.20"),
                        "VCID-1",
                        VulnSeverity::High,
                    )],
                    packages: vec![lodash()],
                },
            )
            .with_output(
                Pipeline::ScanCodebase,
                PipelineOutput {
                    findings: vec![Finding::license(Subject::path("a.c"), "mit")],
                    packages: vec![],
                },
            );
        let dir = source();
        let out = ScanExecutor::new(&scanner)
            .execute(utf8(&dir), &names(&["scan_codebase", "find_vulnerabilities"]));

        assert_eq!(out.completed, names(&["scan_codebase", "find_vulnerabilities"]));
        assert_eq!(out.findings[0].pipeline, "scan_codebase");
        assert_eq!(out.findings[1].pipeline, "find_vulnerabilities");
        assert_eq!(out.packages.len(), 1);
        assert_eq!(out.packages[0].vulnerabilities.len(), 1);
        assert!(!out.is_partial());
    }

    #[test]
    fn unknown_pipeline_keeps_partial_results() {
        let scanner = FakeScanner::new().with_output(
            Pipeline::ScanCodebase,
            PipelineOutput {
                findings: vec![Finding::license(Subject::path("a.c"), "gpl-3.0")],
                packages: vec![],
            },
        );
        let dir = source();
        let out = ScanExecutor::new(&scanner)
            .execute(utf8(&dir), &names(&["scan_codebase", "scan_everything"]));

        assert_eq!(out.findings.len(), 1);
        assert_eq!(out.failed, names(&["scan_everything"]));
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].code, ids::CODE_SCAN_EXECUTION_ERROR);
        assert_eq!(out.warnings[0].component, "pipeline:scan_everything");
    }

    #[test]
    fn unreadable_source_fails_every_pipeline() {
        let scanner = FakeScanner::new();
        let out = ScanExecutor::new(&scanner).execute(
            Utf8Path::new("/definitely/not/a/source/tree"),
            &names(&["scan_codebase", "inspect_packages"]),
        );
        assert!(out.completed.is_empty());
        assert_eq!(out.failed.len(), 2);
        assert!(
            out.warnings
                .iter()
                .all(|w| w.code == ids::CODE_SCAN_EXECUTION_ERROR)
        );
    }

    #[test]
    fn upstream_unavailable_degrades_without_failing_the_pipeline() {
        let scanner = FakeScanner::new().with_output(
            Pipeline::FindVulnerabilities,
            PipelineOutput {
                findings: vec![],
                packages: vec![lodash()],
            },
        );
        let lookup = FakeLookup::unavailable();
        let dir = source();
        let out = ScanExecutor::new(&scanner)
            .with_lookup(&lookup)
            .cancel_on_failure(true)
            .execute(utf8(&dir), &names(&["find_vulnerabilities", "scan_codebase"]));

        assert_eq!(out.completed, names(&["find_vulnerabilities", "scan_codebase"]));
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].code, ids::CODE_UPSTREAM_UNAVAILABLE);
    }

    #[test]
    fn lookup_results_are_unioned_and_deduplicated() {
        let embedded = Finding::vulnerability(
            Subject::package("pkg:npm/lodash@4.17.20"),
            "VCID-1",
            VulnSeverity::High,
        );
        let scanner = FakeScanner::new().with_output(
            Pipeline::FindVulnerabilities,
            PipelineOutput {
                findings: vec![embedded.clone()],
                packages: vec![lodash()],
            },
        );
        let lookup = FakeLookup::with_findings(vec![
            embedded,
            Finding::vulnerability(
                Subject::package("pkg:npm/lodash@4.17.20"),
                "VCID-2",
                VulnSeverity::Critical,
            ),
        ]);
        let dir = source();
        let out = ScanExecutor::new(&scanner)
            .with_lookup(&lookup)
            .execute(utf8(&dir), &names(&["find_vulnerabilities"]));

        assert_eq!(out.findings.len(), 2);
        assert_eq!(lookup.queried(), names(&["pkg:npm/lodash@4.17.20"]));
    }

    #[test]
    fn partial_lookup_keeps_findings_fetched_before_the_outage() {
        let attrs = PackageRecord::new("pkg:pypi/attrs@23.1.0", "attrs", Some("23.1.0".into()));
        let scanner = FakeScanner::new().with_output(
            Pipeline::FindVulnerabilities,
            PipelineOutput {
                findings: vec![],
                packages: vec![lodash(), attrs],
            },
        );
        let lookup = FakeLookup::with_findings(vec![
            Finding::vulnerability(
                Subject::package("pkg:npm/lodash@4.17.20"),
                "VCID-2",
                VulnSeverity::Critical,
            ),
            Finding::vulnerability(
                Subject::package("pkg:pypi/attrs@23.1.0"),
                "VCID-3",
                VulnSeverity::Low,
            ),
        ])
        .unavailable_after(1);
        let dir = source();
        let out = ScanExecutor::new(&scanner)
            .with_lookup(&lookup)
            .execute(utf8(&dir), &names(&["find_vulnerabilities"]));

        assert_eq!(out.completed, names(&["find_vulnerabilities"]));
        // Purls are queried in sorted order, so npm/lodash is answered before pypi/attrs.
        assert_eq!(out.findings.len(), 1);
        assert_eq!(
            out.findings[0].subject,
            Subject::package("pkg:npm/lodash@4.17.20")
        );
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].code, ids::CODE_UPSTREAM_UNAVAILABLE);
    }

    #[test]
    fn sequential_failure_cancels_pipelines_not_yet_started() {
        let scanner = FakeScanner::new();
        let dir = source();
        let executor = ScanExecutor::new(&scanner).cancel_on_failure(true);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .build()
            .expect("pool");
        let out = pool.install(|| {
            executor.execute(utf8(&dir), &names(&["bogus", "scan_codebase", "inspect_packages"]))
        });

        assert_eq!(out.failed, names(&["bogus"]));
        assert!(out.completed.is_empty());
        let cancelled = out
            .warnings
            .iter()
            .filter(|w| w.code == ids::CODE_PIPELINE_CANCELLED)
            .count();
        assert_eq!(cancelled, 2);
    }

    #[test]
    fn assembly_merges_by_purl_and_attaches_licenses() {
        let packages = vec![lodash(), lodash()];
        let findings = vec![
            Finding::license(Subject::package("pkg:npm/lodash@4.17.20"), "MIT"),
            Finding::license(Subject::package("pkg:npm/unknown@1.0.0"), "mit"),
            Finding::license(Subject::path("a.c"), "gpl-3.0"),
        ];
        let out = assemble_packages(packages, &findings);
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0].licenses.iter().cloned().collect::<Vec<_>>(),
            vec!["mit".to_string()]
        );
    }
}
