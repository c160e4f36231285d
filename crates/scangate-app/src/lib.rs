//! Use case orchestration for scangate.
//!
//! This crate provides the application layer: use cases that coordinate the scan, SBOM,
//! domain, and render layers. It is intentionally thin and delegates heavy lifting to them.
//!
//! The CLI crate depends on this; it only handles argument parsing and I/O.

#![forbid(unsafe_code)]

mod check;
mod explain;
mod output;
mod policy;
mod render;
mod report;

pub use check::{run_check, CheckInput, CheckOutput};
pub use explain::{
    format_explanation, format_not_found, run_explain, ExplainOutput, IdentifierKind,
};
pub use output::{parse_output_formats, OutputFormat};
pub use policy::load_policy;
pub use render::{render_annotations, render_markdown};
pub use report::{
    add_artifact, add_warning, parse_report_json, runtime_error_report, serialize_findings,
    serialize_report, to_renderable,
};
