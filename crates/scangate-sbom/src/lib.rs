//! SBOM generation from the scanned package inventory.
//!
//! Output is deterministic: packages are sorted by purl, and serial numbers and document
//! namespaces are derived from a digest of the inventory. Only timestamps vary between runs.

#![forbid(unsafe_code)]

mod cyclonedx;
pub mod license;
mod spdx;

use rayon::prelude::*;
use scangate_types::PackageRecord;
use sha2::{Digest, Sha256};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SbomFormat {
    /// CycloneDX 1.5 JSON.
    CycloneDx,
    /// SPDX 2.3 JSON.
    Spdx,
}

impl SbomFormat {
    /// Expand a user-facing selector. `both` yields both formats.
    pub fn parse_selector(selector: &str) -> Result<Vec<SbomFormat>, SbomFormatError> {
        match selector.trim().to_ascii_lowercase().as_str() {
            "cyclonedx" | "cyclonedx-json" | "cdx" => Ok(vec![SbomFormat::CycloneDx]),
            "spdx" | "spdx-json" => Ok(vec![SbomFormat::Spdx]),
            "both" => Ok(vec![SbomFormat::CycloneDx, SbomFormat::Spdx]),
            _ => Err(SbomFormatError::Unsupported(selector.trim().to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SbomFormat::CycloneDx => "cyclonedx",
            SbomFormat::Spdx => "spdx",
        }
    }

    /// Default artifact file name.
    pub fn file_name(self) -> &'static str {
        match self {
            SbomFormat::CycloneDx => "sbom.cdx.json",
            SbomFormat::Spdx => "sbom.spdx.json",
        }
    }
}

impl std::fmt::Display for SbomFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum SbomFormatError {
    #[error("unsupported SBOM format '{0}' (expected cyclonedx|spdx|both)")]
    Unsupported(String),

    #[error("failed to write {format} SBOM: {message}")]
    Write {
        format: SbomFormat,
        message: String,
    },
}

impl SbomFormatError {
    /// The format or selector the error is about.
    pub fn component(&self) -> String {
        match self {
            SbomFormatError::Unsupported(s) => format!("sbom:{s}"),
            SbomFormatError::Write { format, .. } => format!("sbom:{format}"),
        }
    }
}

/// Document-level metadata shared by all formats.
#[derive(Clone, Debug)]
pub struct SbomContext {
    /// Name of the scanned project.
    pub name: String,
    pub tool_name: String,
    pub tool_version: String,
    pub timestamp: OffsetDateTime,
}

/// A rendered SBOM document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SbomDocument {
    pub format: SbomFormat,
    pub content: String,
}

/// Outcome of generating every requested format.
#[derive(Debug, Default)]
pub struct SbomRun {
    pub documents: Vec<SbomDocument>,
    pub errors: Vec<SbomFormatError>,
}

/// Render one document.
pub fn generate(
    format: SbomFormat,
    packages: &[PackageRecord],
    ctx: &SbomContext,
) -> Result<SbomDocument, SbomFormatError> {
    let sorted = sorted_packages(packages);
    let digest = inventory_digest(&ctx.name, &sorted);
    let rendered = match format {
        SbomFormat::CycloneDx => cyclonedx::render(&sorted, ctx, &digest),
        SbomFormat::Spdx => spdx::render(&sorted, ctx, &digest),
    };
    let content = rendered.map_err(|e| SbomFormatError::Write {
        format,
        message: e.to_string(),
    })?;
    Ok(SbomDocument { format, content })
}

/// Render every requested format concurrently.
///
/// Unsupported selectors are reported and skipped; the remaining formats are unaffected.
/// Documents come back in first-requested order, each format at most once.
pub fn generate_all(
    selectors: &[String],
    packages: &[PackageRecord],
    ctx: &SbomContext,
) -> SbomRun {
    let mut run = SbomRun::default();
    let mut formats: Vec<SbomFormat> = Vec::new();
    for selector in selectors {
        match SbomFormat::parse_selector(selector) {
            Ok(parsed) => {
                for f in parsed {
                    if !formats.contains(&f) {
                        formats.push(f);
                    }
                }
            }
            Err(e) => run.errors.push(e),
        }
    }

    let results: Vec<Result<SbomDocument, SbomFormatError>> = formats
        .par_iter()
        .map(|f| generate(*f, packages, ctx))
        .collect();
    for r in results {
        match r {
            Ok(doc) => run.documents.push(doc),
            Err(e) => run.errors.push(e),
        }
    }
    run
}

fn sorted_packages(packages: &[PackageRecord]) -> Vec<PackageRecord> {
    let mut sorted = packages.to_vec();
    sorted.sort_by(|a, b| a.purl.cmp(&b.purl));
    sorted.dedup_by(|a, b| a.purl == b.purl);
    sorted
}

/// SHA-256 over the project name and the sorted inventory.
fn inventory_digest(name: &str, packages: &[PackageRecord]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    for p in packages {
        hasher.update(b"\n");
        hasher.update(p.purl.as_bytes());
        for l in &p.licenses {
            hasher.update(b"|");
            hasher.update(l.as_bytes());
        }
        for v in &p.vulnerabilities {
            hasher.update(b"#");
            hasher.update(v.label().as_bytes());
        }
    }
    let out = hasher.finalize();
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&out);
    digest
}

/// Name-based (version 5) UUID for an inventory digest.
fn uuid_from_digest(digest: &[u8; 32]) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, digest)
}
