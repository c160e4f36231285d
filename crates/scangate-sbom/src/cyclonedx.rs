//! CycloneDX 1.5 JSON writer.

use crate::{license, uuid_from_digest, SbomContext};
use scangate_types::{FindingValue, PackageRecord};
use serde::Serialize;
use time::OffsetDateTime;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Bom<'a> {
    bom_format: &'static str,
    spec_version: &'static str,
    serial_number: String,
    version: u32,
    metadata: Metadata<'a>,
    components: Vec<Component<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    vulnerabilities: Vec<Vulnerability<'a>>,
}

#[derive(Serialize)]
struct Metadata<'a> {
    #[serde(with = "time::serde::rfc3339")]
    timestamp: OffsetDateTime,
    tools: Tools<'a>,
    component: RootComponent<'a>,
}

#[derive(Serialize)]
struct Tools<'a> {
    components: Vec<ToolComponent<'a>>,
}

#[derive(Serialize)]
struct ToolComponent<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    name: &'a str,
    version: &'a str,
}

#[derive(Serialize)]
struct RootComponent<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    name: &'a str,
}

#[derive(Serialize)]
struct Component<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(rename = "bom-ref")]
    bom_ref: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<&'a str>,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
    purl: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    licenses: Vec<LicenseChoice>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum LicenseChoice {
    License { license: LicenseId },
    Expression { expression: String },
}

#[derive(Serialize)]
struct LicenseId {
    id: String,
}

#[derive(Serialize)]
struct Vulnerability<'a> {
    id: &'a str,
    ratings: Vec<Rating>,
    affects: Vec<Affects<'a>>,
}

#[derive(Serialize)]
struct Rating {
    severity: &'static str,
}

#[derive(Serialize)]
struct Affects<'a> {
    #[serde(rename = "ref")]
    reference: &'a str,
}

pub(crate) fn render(
    packages: &[PackageRecord],
    ctx: &SbomContext,
    digest: &[u8; 32],
) -> Result<String, serde_json::Error> {
    let components = packages.iter().map(component).collect();

    let mut vulnerabilities = Vec::new();
    for p in packages {
        for v in &p.vulnerabilities {
            if let FindingValue::Vulnerability {
                vulnerability_id,
                severity,
            } = &v.value
            {
                vulnerabilities.push(Vulnerability {
                    id: vulnerability_id,
                    ratings: vec![Rating {
                        severity: cdx_severity(severity.as_str()),
                    }],
                    affects: vec![Affects {
                        reference: &p.purl,
                    }],
                });
            }
        }
    }
    vulnerabilities.sort_by(|a, b| (a.id, a.affects[0].reference).cmp(&(b.id, b.affects[0].reference)));

    let bom = Bom {
        bom_format: "CycloneDX",
        spec_version: "1.5",
        serial_number: format!("urn:uuid:{}", uuid_from_digest(digest)),
        version: 1,
        metadata: Metadata {
            timestamp: ctx.timestamp,
            tools: Tools {
                components: vec![ToolComponent {
                    kind: "application",
                    name: &ctx.tool_name,
                    version: &ctx.tool_version,
                }],
            },
            component: RootComponent {
                kind: "application",
                name: &ctx.name,
            },
        },
        components,
        vulnerabilities,
    };
    let mut out = serde_json::to_string_pretty(&bom)?;
    out.push('\n');
    Ok(out)
}

fn component(p: &PackageRecord) -> Component<'_> {
    let licenses = match license::combine(&p.licenses) {
        None => Vec::new(),
        Some(expr) if license::is_listed(&expr) => vec![LicenseChoice::License {
            license: LicenseId { id: expr },
        }],
        Some(expr) => vec![LicenseChoice::Expression { expression: expr }],
    };
    Component {
        kind: "library",
        bom_ref: &p.purl,
        group: p.namespace.as_deref(),
        name: &p.name,
        version: p.version.as_deref(),
        purl: &p.purl,
        licenses,
    }
}

/// CycloneDX has no `none` rating; an unrated vulnerability is `unknown`.
fn cdx_severity(severity: &str) -> &'static str {
    match severity {
        "critical" => "critical",
        "high" => "high",
        "medium" => "medium",
        "low" => "low",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use crate::{generate, SbomContext, SbomFormat};
    use scangate_types::{Finding, PackageRecord, Subject, VulnSeverity};
    use time::macros::datetime;

    #[test]
    fn document_shape() {
        let mut pkg = PackageRecord::new("pkg:npm/lodash@4.17.20", "lodash", Some("4.17.20".into()));
        pkg.licenses.insert("mit".to_string());
        pkg.vulnerabilities.push(Finding::vulnerability(
            Subject::package("pkg:npm/lodash@4.17.20"),
            "VCID-1",
            VulnSeverity::None,
        ));
        let mut other = PackageRecord::new("pkg:pypi/x@1", "x", Some("1".into()));
        other.licenses.insert("mit or acme".to_string());

        let ctx = SbomContext {
            name: "demo".to_string(),
            tool_name: "scangate".to_string(),
            tool_version: "0.1.0".to_string(),
            timestamp: datetime!(2024-01-01 00:00 UTC),
        };
        let doc = generate(SbomFormat::CycloneDx, &[other, pkg], &ctx).expect("render");
        let v: serde_json::Value = serde_json::from_str(&doc.content).expect("json");

        assert_eq!(v["bomFormat"], "CycloneDX");
        assert_eq!(v["specVersion"], "1.5");
        assert!(v["serialNumber"].as_str().expect("serial").starts_with("urn:uuid:"));
        assert_eq!(v["metadata"]["timestamp"], "2024-01-01T00:00:00Z");
        assert_eq!(v["components"][0]["purl"], "pkg:npm/lodash@4.17.20");
        assert_eq!(v["components"][0]["licenses"][0]["license"]["id"], "MIT");
        assert_eq!(
            v["components"][1]["licenses"][0]["expression"],
            "MIT OR LicenseRef-scancode-acme"
        );
        assert_eq!(v["vulnerabilities"][0]["ratings"][0]["severity"], "unknown");
        assert_eq!(v["vulnerabilities"][0]["affects"][0]["ref"], "pkg:npm/lodash@4.17.20");
    }
}
