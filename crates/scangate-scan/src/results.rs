//! Serde model of the ScanCode.io results document.
//!
//! Only the fields the pipelines read are modelled; everything else is ignored.

use scangate_types::{ids, Finding, PackageRecord, Subject, VulnSeverity};
use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ScanResults {
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub packages: Vec<Package>,
    /// Vulnerabilities reported outside of any package entry.
    #[serde(default)]
    pub vulnerabilities: Vec<Vulnerability>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub license_detections: Vec<LicenseDetection>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LicenseDetection {
    #[serde(default)]
    pub license_expression: Option<String>,
    #[serde(default)]
    pub matches: Vec<LicenseMatch>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LicenseMatch {
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Package {
    #[serde(default)]
    pub purl: Option<String>,
    #[serde(rename = "type", default)]
    pub package_type: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub declared_license_expression: Option<String>,
    #[serde(default)]
    pub affected_by_vulnerabilities: Vec<Vulnerability>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Vulnerability {
    #[serde(default, alias = "vulnerability")]
    pub vulnerability_id: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub risk_score: Option<f64>,
    /// Affected package, for entries outside a package.
    #[serde(default)]
    pub purl: Option<String>,
}

impl ScanResults {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// License findings from per-file detections. Subject is the file path.
    pub fn resource_license_findings(&self) -> Vec<Finding> {
        let mut out = Vec::new();
        for resource in &self.resources {
            for detection in &resource.license_detections {
                let Some(expr) = non_empty(detection.license_expression.as_deref()) else {
                    continue;
                };
                let confidence = detection
                    .matches
                    .iter()
                    .filter_map(|m| m.score)
                    .fold(None, |best: Option<f64>, s| Some(best.map_or(s, |b| b.max(s))));
                out.push(
                    Finding::license(Subject::path(&resource.path), expr)
                        .with_confidence(confidence),
                );
            }
        }
        out
    }

    /// Declared-license findings. Subject is the package URL.
    pub fn package_license_findings(&self) -> Vec<Finding> {
        self.packages
            .iter()
            .filter_map(|p| {
                let purl = p.purl()?;
                let expr = non_empty(p.declared_license_expression.as_deref())?;
                Some(Finding::license(Subject::package(purl), expr))
            })
            .collect()
    }

    /// Vulnerability findings embedded in the results, package entries first.
    pub fn vulnerability_findings(&self) -> Vec<Finding> {
        let mut out = Vec::new();
        for package in &self.packages {
            let Some(purl) = package.purl() else {
                continue;
            };
            for v in &package.affected_by_vulnerabilities {
                if let Some(f) = v.to_finding(Subject::package(purl.clone())) {
                    out.push(f);
                }
            }
        }
        for v in &self.vulnerabilities {
            // Not tied to a package: attribute it to the scanned tree as a whole.
            let subject = match non_empty(v.purl.as_deref()) {
                Some(purl) => Subject::package(purl),
                None => Subject::path("."),
            };
            if let Some(f) = v.to_finding(subject) {
                out.push(f);
            }
        }
        out
    }

    /// Package inventory, without license or vulnerability attachments.
    pub fn package_records(&self) -> Vec<PackageRecord> {
        self.packages.iter().filter_map(Package::to_record).collect()
    }
}

impl Package {
    /// The package URL, built from its parts when the document omits it.
    pub fn purl(&self) -> Option<String> {
        if let Some(purl) = non_empty(self.purl.as_deref()) {
            return Some(purl.to_string());
        }
        let name = non_empty(self.name.as_deref())?;
        let ty = non_empty(self.package_type.as_deref()).unwrap_or("generic");
        let mut purl = format!("pkg:{ty}/");
        if let Some(ns) = non_empty(self.namespace.as_deref()) {
            purl.push_str(ns);
            purl.push('/');
        }
        purl.push_str(name);
        if let Some(version) = non_empty(self.version.as_deref()) {
            purl.push('@');
            purl.push_str(version);
        }
        Some(purl)
    }

    fn to_record(&self) -> Option<PackageRecord> {
        let purl = self.purl()?;
        let name = non_empty(self.name.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| name_from_purl(&purl));
        let mut record = PackageRecord::new(
            purl,
            name,
            non_empty(self.version.as_deref()).map(str::to_string),
        );
        record.package_type = non_empty(self.package_type.as_deref()).map(str::to_string);
        record.namespace = non_empty(self.namespace.as_deref()).map(str::to_string);
        Some(record)
    }
}

impl Vulnerability {
    /// A label wins over a numeric score; with neither the severity ranks as `none`.
    pub fn severity(&self) -> VulnSeverity {
        if let Some(sev) = self.severity.as_deref().and_then(VulnSeverity::parse_label) {
            return sev;
        }
        self.risk_score
            .map(VulnSeverity::from_risk_score)
            .unwrap_or(VulnSeverity::None)
    }

    pub fn to_finding(&self, subject: Subject) -> Option<Finding> {
        let id = non_empty(self.vulnerability_id.as_deref())?;
        Some(Finding::vulnerability(subject, id, self.severity()))
    }

    pub fn to_lookup_finding(&self, subject: Subject) -> Option<Finding> {
        self.to_finding(subject)
            .map(|f| f.from_tool(ids::TOOL_VULNERABLECODE))
    }
}

fn non_empty(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

fn name_from_purl(purl: &str) -> String {
    let without_version = purl.split('@').next().unwrap_or(purl);
    without_version
        .rsplit('/')
        .next()
        .unwrap_or(without_version)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
  "resources": [
    { "path": "codebase/src/main.c",
      "license_detections": [
        { "license_expression": "GPL-3.0", "matches": [ { "score": 88.5 }, { "score": 100.0 } ] },
        { "license_expression": "" }
      ] },
    { "path": "codebase/README.md" }
  ],
  "packages": [
    { "type": "npm", "name": "lodash", "version": "4.17.20",
      "declared_license_expression": "mit",
      "affected_by_vulnerabilities": [
        { "vulnerability_id": "VCID-aaaa", "severity": "HIGH" },
        { "vulnerability_id": "VCID-bbbb", "risk_score": 9.1 }
      ] },
    { "purl": "pkg:pypi/attrs@23.1.0", "name": "attrs" }
  ],
  "vulnerabilities": [
    { "vulnerability_id": "VCID-cccc", "severity": "bogus" }
  ]
}"#;

    #[test]
    fn resource_detections_become_path_findings() {
        let results = ScanResults::from_json(DOC).expect("parse");
        let findings = results.resource_license_findings();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].subject, Subject::path("src/main.c"));
        assert_eq!(findings[0].license_id(), Some("gpl-3.0"));
        assert_eq!(findings[0].confidence, Some(100.0));
    }

    #[test]
    fn purl_is_built_from_parts() {
        let results = ScanResults::from_json(DOC).expect("parse");
        let records = results.package_records();
        assert_eq!(records[0].purl, "pkg:npm/lodash@4.17.20");
        assert_eq!(records[0].package_type.as_deref(), Some("npm"));
        assert_eq!(records[1].purl, "pkg:pypi/attrs@23.1.0");
    }

    #[test]
    fn vulnerability_severity_resolution() {
        let results = ScanResults::from_json(DOC).expect("parse");
        let vulns = results.vulnerability_findings();
        let sev: Vec<_> = vulns.iter().map(Finding::label).collect();
        assert_eq!(
            sev,
            vec![
                "vuln:VCID-aaaa (high)",
                "vuln:VCID-bbbb (critical)",
                "vuln:VCID-cccc (none)",
            ]
        );
        assert_eq!(vulns[2].subject, Subject::path("."));
    }

    #[test]
    fn declared_licenses_attach_to_purl() {
        let results = ScanResults::from_json(DOC).expect("parse");
        let findings = results.package_license_findings();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].subject, Subject::package("pkg:npm/lodash@4.17.20"));
    }
}
