//! SPDX 2.3 JSON writer.

use crate::{license, SbomContext};
use scangate_types::PackageRecord;
use serde::Serialize;
use std::collections::BTreeSet;
use time::OffsetDateTime;

const NOASSERTION: &str = "NOASSERTION";
const NAMESPACE_BASE: &str = "https://spdx.org/spdxdocs";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Document<'a> {
    spdx_version: &'static str,
    data_license: &'static str,
    #[serde(rename = "SPDXID")]
    spdx_id: &'static str,
    name: &'a str,
    document_namespace: String,
    creation_info: CreationInfo,
    packages: Vec<Package<'a>>,
    relationships: Vec<Relationship>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    has_extracted_licensing_infos: Vec<ExtractedLicense>,
}

#[derive(Serialize)]
struct CreationInfo {
    #[serde(with = "time::serde::rfc3339")]
    created: OffsetDateTime,
    creators: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Package<'a> {
    #[serde(rename = "SPDXID")]
    spdx_id: String,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    version_info: Option<&'a str>,
    download_location: &'static str,
    files_analyzed: bool,
    license_concluded: &'static str,
    license_declared: String,
    copyright_text: &'static str,
    external_refs: Vec<ExternalRef<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExternalRef<'a> {
    reference_category: &'static str,
    reference_type: &'static str,
    reference_locator: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Relationship {
    spdx_element_id: &'static str,
    relationship_type: &'static str,
    related_spdx_element: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtractedLicense {
    license_id: String,
    extracted_text: String,
    name: String,
}

pub(crate) fn render(
    packages: &[PackageRecord],
    ctx: &SbomContext,
    digest: &[u8; 32],
) -> Result<String, serde_json::Error> {
    let mut refs = BTreeSet::new();
    let mut spdx_packages = Vec::with_capacity(packages.len());
    let mut relationships = Vec::with_capacity(packages.len());

    for (i, p) in packages.iter().enumerate() {
        let spdx_id = format!("SPDXRef-Package-{}", i + 1);
        let declared = license::combine(&p.licenses);
        if let Some(expr) = &declared {
            refs.extend(license::license_refs(expr));
        }
        relationships.push(Relationship {
            spdx_element_id: "SPDXRef-DOCUMENT",
            relationship_type: "DESCRIBES",
            related_spdx_element: spdx_id.clone(),
        });
        spdx_packages.push(Package {
            spdx_id,
            name: &p.name,
            version_info: p.version.as_deref(),
            download_location: NOASSERTION,
            files_analyzed: false,
            license_concluded: NOASSERTION,
            license_declared: declared.unwrap_or_else(|| NOASSERTION.to_string()),
            copyright_text: NOASSERTION,
            external_refs: vec![ExternalRef {
                reference_category: "PACKAGE-MANAGER",
                reference_type: "purl",
                reference_locator: &p.purl,
            }],
        });
    }

    let extracted = refs
        .into_iter()
        .map(|id| {
            let key = id
                .strip_prefix(license::LICENSE_REF_PREFIX)
                .unwrap_or(&id)
                .to_string();
            ExtractedLicense {
                extracted_text: format!("See ScanCode license key '{key}'."),
                name: key,
                license_id: id,
            }
        })
        .collect();

    let doc = Document {
        spdx_version: "SPDX-2.3",
        data_license: "CC0-1.0",
        spdx_id: "SPDXRef-DOCUMENT",
        name: &ctx.name,
        document_namespace: format!(
            "{NAMESPACE_BASE}/{}-{}",
            sanitize(&ctx.name),
            hex::encode(&digest[..16])
        ),
        creation_info: CreationInfo {
            created: ctx.timestamp,
            creators: vec![format!("Tool: {}-{}", ctx.tool_name, ctx.tool_version)],
        },
        packages: spdx_packages,
        relationships,
        has_extracted_licensing_infos: extracted,
    };
    let mut out = serde_json::to_string_pretty(&doc)?;
    out.push('\n');
    Ok(out)
}

fn sanitize(name: &str) -> String {
    let s: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '-' })
        .collect();
    if s.is_empty() { "scan".to_string() } else { s }
}
