//! Scan executor.
//!
//! Runs named pipelines against a source tree through a [`Scanner`], optionally unions
//! vulnerability lookups, and merges the results into findings plus a package inventory.

#![forbid(unsafe_code)]

mod error;
mod executor;
mod pipeline;
mod results;
mod scancode;
mod vulnerablecode;

#[cfg(any(test, feature = "fake"))]
pub mod fake;

pub use error::ScanError;
pub use executor::{assemble_packages, ScanExecutor, ScanOutcome};
pub use pipeline::{Pipeline, PipelineOutput};
pub use results::ScanResults;
pub use scancode::ScancodeScanner;
pub use vulnerablecode::VulnerableCodeClient;

use camino::Utf8Path;
use scangate_types::Finding;

/// Runs a single pipeline against a source tree.
pub trait Scanner: Send + Sync {
    fn run_pipeline(&self, pipeline: Pipeline, source: &Utf8Path)
    -> Result<PipelineOutput, ScanError>;
}

/// Result of a vulnerability lookup that may have stopped part way.
#[derive(Debug, Default)]
pub struct LookupOutcome {
    /// Findings for every package answered before any failure.
    pub findings: Vec<Finding>,
    /// Set when the service stopped answering; `findings` is then partial.
    pub degraded: Option<ScanError>,
}

/// Looks up known vulnerabilities for package URLs.
pub trait VulnerabilityLookup: Send + Sync {
    /// Returns vulnerability findings whose subject is the affected purl.
    ///
    /// An unreachable service is reported through [`LookupOutcome::degraded`] as
    /// [`ScanError::UpstreamUnavailable`], alongside whatever was fetched before it.
    fn lookup(&self, purls: &[String]) -> Result<LookupOutcome, ScanError>;
}
