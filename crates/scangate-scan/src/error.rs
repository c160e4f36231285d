use scangate_types::ids;
use thiserror::Error;

/// Failure of a single pipeline or of the vulnerability service.
///
/// Everything except [`ScanError::UpstreamUnavailable`] is a scan execution error: fatal for
/// the pipeline, never for the run.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("unknown pipeline '{0}' (expected scan_codebase|inspect_packages|find_vulnerabilities)")]
    UnknownPipeline(String),

    #[error("source directory {path} is not readable: {message}")]
    SourceUnreadable { path: String, message: String },

    #[error("scan results {path} could not be read: {message}")]
    Results { path: String, message: String },

    #[error("pipeline {pipeline} failed: {message}")]
    Execution { pipeline: String, message: String },

    #[error("vulnerability service {url} unavailable after {attempts} attempt(s): {message}")]
    UpstreamUnavailable {
        url: String,
        attempts: u32,
        message: String,
    },
}

impl ScanError {
    /// Fatal errors stop the pipeline and may cancel pipelines that have not started.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ScanError::UpstreamUnavailable { .. })
    }

    /// Warning code used when the error is surfaced in the report.
    pub fn warning_code(&self) -> &'static str {
        match self {
            ScanError::UpstreamUnavailable { .. } => ids::CODE_UPSTREAM_UNAVAILABLE,
            _ => ids::CODE_SCAN_EXECUTION_ERROR,
        }
    }
}
