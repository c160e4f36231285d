//! Stable DTOs and IDs used across the scangate workspace.
//!
//! This crate is intentionally boring:
//! - findings, package records and the emitted report envelope
//! - stable rule IDs, codes and pipeline names
//! - canonical repo-relative path handling
//! - explain registry for remediation guidance

#![forbid(unsafe_code)]

pub mod explain;
pub mod finding;
pub mod ids;
pub mod path;
pub mod receipt;

pub use explain::{lookup_explanation, ExamplePair, Explanation};
pub use finding::{
    normalize_license, Finding, FindingKind, FindingValue, PackageRecord, Subject, VulnSeverity,
};
pub use path::RepoPath;
pub use receipt::{
    ArtifactPointer, ArtifactType, ReportEnvelope, RunMeta, ScanData, ScangateReport, ToolMeta,
    Verdict, VerdictCounts, VerdictStatus, Violation, Warning, SCHEMA_REPORT_V1,
};
