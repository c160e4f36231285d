use crate::{Pipeline, PipelineOutput, ScanError, ScanResults, Scanner};
use camino::{Utf8Path, Utf8PathBuf};
use std::sync::OnceLock;
use tracing::debug;

/// Scanner backed by the JSON results document produced by ScanCode.io.
///
/// The document is read once, on first use, and shared by all pipelines.
pub struct ScancodeScanner {
    results_path: Utf8PathBuf,
    results: OnceLock<Result<ScanResults, ScanError>>,
}

impl ScancodeScanner {
    pub fn new(results_path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            results_path: results_path.into(),
            results: OnceLock::new(),
        }
    }

    pub fn results_path(&self) -> &Utf8Path {
        &self.results_path
    }

    fn results(&self) -> Result<&ScanResults, ScanError> {
        self.results
            .get_or_init(|| load_results(&self.results_path))
            .as_ref()
            .map_err(Clone::clone)
    }
}

fn load_results(path: &Utf8Path) -> Result<ScanResults, ScanError> {
    let text = std::fs::read_to_string(path).map_err(|e| ScanError::Results {
        path: path.to_string(),
        message: e.to_string(),
    })?;
    let results = ScanResults::from_json(&text).map_err(|e| ScanError::Results {
        path: path.to_string(),
        message: e.to_string(),
    })?;
    debug!(
        path = %path,
        resources = results.resources.len(),
        packages = results.packages.len(),
        "loaded scan results"
    );
    Ok(results)
}

impl Scanner for ScancodeScanner {
    fn run_pipeline(
        &self,
        pipeline: Pipeline,
        _source: &Utf8Path,
    ) -> Result<PipelineOutput, ScanError> {
        let results = self.results()?;
        let output = match pipeline {
            Pipeline::ScanCodebase => {
                let mut findings = results.resource_license_findings();
                findings.extend(results.package_license_findings());
                PipelineOutput {
                    findings,
                    packages: results.package_records(),
                }
            }
            Pipeline::InspectPackages => PipelineOutput {
                findings: results.package_license_findings(),
                packages: results.package_records(),
            },
            Pipeline::FindVulnerabilities => PipelineOutput {
                findings: results.vulnerability_findings(),
                packages: results.package_records(),
            },
        };
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scangate_types::FindingKind;

    fn write_results(dir: &tempfile::TempDir, text: &str) -> Utf8PathBuf {
        let path = Utf8PathBuf::from_path_buf(dir.path().join("results.json")).expect("utf8 path");
        std::fs::write(&path, text).expect("write results");
        path
    }

    #[test]
    fn pipelines_select_their_slice_of_the_results() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_results(
            &dir,
            r#"{
  "resources": [ { "path": "a.c", "license_detections": [ { "license_expression": "mit" } ] } ],
  "packages": [ { "purl": "pkg:cargo/serde@1.0.0", "name": "serde",
                  "declared_license_expression": "mit OR apache-2.0",
                  "affected_by_vulnerabilities": [ { "vulnerability_id": "VCID-1", "severity": "low" } ] } ]
}"#,
        );
        let scanner = ScancodeScanner::new(path);
        let source = Utf8Path::new(".");

        let scan = scanner
            .run_pipeline(Pipeline::ScanCodebase, source)
            .expect("scan_codebase");
        assert_eq!(scan.findings.len(), 2);
        assert_eq!(scan.packages.len(), 1);

        let inspect = scanner
            .run_pipeline(Pipeline::InspectPackages, source)
            .expect("inspect_packages");
        assert_eq!(inspect.findings.len(), 1);

        let vulns = scanner
            .run_pipeline(Pipeline::FindVulnerabilities, source)
            .expect("find_vulnerabilities");
        assert!(
            vulns
                .findings
                .iter()
                .all(|f| f.kind() == FindingKind::Vulnerability)
        );
    }

    #[test]
    fn malformed_results_fail_every_pipeline() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_results(&dir, "{ not json");
        let scanner = ScancodeScanner::new(path);
        let err = scanner
            .run_pipeline(Pipeline::ScanCodebase, Utf8Path::new("."))
            .unwrap_err();
        assert!(matches!(err, ScanError::Results { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn missing_results_file_is_an_execution_error() {
        let scanner = ScancodeScanner::new("/definitely/not/here/results.json");
        let err = scanner
            .run_pipeline(Pipeline::InspectPackages, Utf8Path::new("."))
            .unwrap_err();
        assert!(matches!(err, ScanError::Results { .. }));
    }
}
