//! CLI entry point for scangate.
//!
//! This module is intentionally thin: it handles argument parsing, I/O, and exit codes.
//! All business logic lives in the `scangate-app` crate.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{ArgAction, Parser, Subcommand};
use scangate_app::{
    add_artifact, add_warning, parse_report_json, render_annotations, render_markdown, run_check,
    run_explain, runtime_error_report, serialize_findings, serialize_report, to_renderable,
    CheckInput, CheckOutput, ExplainOutput, OutputFormat,
};
use scangate_scan::ScancodeScanner;
use scangate_settings::Overrides;
use scangate_types::{ids, ArtifactPointer, ArtifactType, ScangateReport, Warning};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "scangate",
    version,
    about = "License and vulnerability compliance gate for ScanCode results"
)]
struct Cli {
    /// Path to scangate config TOML. A missing file means defaults.
    #[arg(long, default_value = "scangate.toml", global = true)]
    config: Utf8PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG wins when set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the scan pipelines, generate SBOMs, evaluate policy, and write artifacts.
    Check(CheckArgs),

    /// Render markdown from an existing JSON report.
    Md {
        /// Path to the JSON report file.
        #[arg(long, default_value = "artifacts/scangate/report.json")]
        report: Utf8PathBuf,

        /// Where to write the Markdown output (if not specified, prints to stdout).
        #[arg(long, short)]
        output: Option<Utf8PathBuf>,
    },

    /// Render GitHub Actions annotations from an existing JSON report.
    Annotations {
        /// Path to the JSON report file.
        #[arg(long, default_value = "artifacts/scangate/report.json")]
        report: Utf8PathBuf,

        /// Maximum number of annotations to emit.
        #[arg(long, default_value = "10")]
        max: usize,
    },

    /// Explain a rule id or code with remediation guidance.
    Explain {
        /// The rule id (e.g. "license.prohibited") or code (e.g. "policy_load_error").
        identifier: String,
    },
}

#[derive(clap::Args, Debug)]
struct CheckArgs {
    /// Root of the source tree that was scanned.
    #[arg(long, default_value = ".")]
    source: Utf8PathBuf,

    /// ScanCode results JSON to read findings from.
    #[arg(long, default_value = "scancode-results.json")]
    input: Utf8PathBuf,

    /// Policy file (JSON or TOML).
    #[arg(long)]
    policy: Option<String>,

    /// Pipelines to run (comma or space separated).
    #[arg(long)]
    pipelines: Option<String>,

    /// Report outputs beyond report.json (json, markdown, gha).
    #[arg(long)]
    output_formats: Option<String>,

    /// SBOM formats (cyclonedx, spdx, both).
    #[arg(long = "sbom-format")]
    sbom_formats: Option<String>,

    /// Generate SBOM documents (true|false).
    #[arg(long)]
    generate_sbom: Option<String>,

    /// Fail the run when violations are found (true|false).
    #[arg(long)]
    fail_on_findings: Option<String>,

    /// Evaluate findings against the policy (true|false).
    #[arg(long)]
    check_compliance: Option<String>,

    /// Treat any vulnerability as a violation regardless of severity (true|false).
    #[arg(long)]
    compliance_fail_on_vulnerabilities: Option<String>,

    /// Stop outstanding pipelines after the first failure (true|false).
    #[arg(long)]
    cancel_on_failure: Option<String>,

    /// Base URL of a VulnerableCode instance for package vulnerability lookups.
    #[arg(long)]
    vulnerablecode_url: Option<String>,

    /// Retries per package lookup before the service is treated as unavailable.
    #[arg(long)]
    vulnerablecode_retries: Option<String>,

    /// Directory that receives report.json and every other artifact.
    #[arg(long, default_value = "artifacts/scangate")]
    out_dir: Utf8PathBuf,

    /// Maximum number of annotations printed when the gha output is enabled.
    #[arg(long, default_value = "10")]
    max_annotations: usize,
}

impl CheckArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            policy: self.policy.clone(),
            pipelines: self.pipelines.clone(),
            output_formats: self.output_formats.clone(),
            sbom_formats: self.sbom_formats.clone(),
            generate_sbom: self.generate_sbom.clone(),
            fail_on_findings: self.fail_on_findings.clone(),
            check_compliance: self.check_compliance.clone(),
            compliance_fail_on_vulnerabilities: self.compliance_fail_on_vulnerabilities.clone(),
            cancel_on_failure: self.cancel_on_failure.clone(),
            vulnerablecode_url: self.vulnerablecode_url.clone(),
            vulnerablecode_retries: self.vulnerablecode_retries.clone(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.cmd {
        Commands::Check(args) => cmd_check(&cli.config, args),
        Commands::Md { report, output } => cmd_md(report, output.as_deref()),
        Commands::Annotations { report, max } => cmd_annotations(report, *max),
        Commands::Explain { identifier } => cmd_explain(identifier),
    }
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    // stdout carries annotations and rendered output; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_check(config: &Utf8Path, args: &CheckArgs) -> anyhow::Result<()> {
    let report_out = args.out_dir.join("report.json");

    // Only a failure before any report exists falls back to the runtime-error report.
    let mut output = match run_scan(config, args) {
        Ok(output) => output,
        Err(err) => {
            let report = runtime_error_report(args.source.as_str(), &format!("{err:#}"));
            let _ = write_report_file(&report_out, &report);
            eprintln!("scangate error: {err:#}");
            std::process::exit(1);
        }
    };

    write_artifacts(args, &mut output);

    if let Err(err) = write_report_file(&report_out, &output.report) {
        eprintln!("scangate error: {err:#}");
        std::process::exit(1);
    }
    info!(report = %report_out, exit_code = output.exit_code(), "artifacts written");

    let code = output.exit_code();
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

fn run_scan(config: &Utf8Path, args: &CheckArgs) -> anyhow::Result<CheckOutput> {
    // Load config if present; missing file is allowed (defaults apply).
    let cfg_text = std::fs::read_to_string(config).unwrap_or_default();
    debug!(config = %config, found = !cfg_text.is_empty(), "loaded run config");

    let scanner = ScancodeScanner::new(args.input.clone());
    run_check(CheckInput {
        source: &args.source,
        config_text: &cfg_text,
        overrides: args.overrides(),
        scanner: &scanner,
        lookup: None,
    })
}

/// Write SBOMs and the requested outputs next to the report.
///
/// A file that cannot be written is skipped and recorded as a warning on the report.
fn write_artifacts(args: &CheckArgs, output: &mut CheckOutput) {
    for sbom in &output.sboms {
        let path = args.out_dir.join(sbom.format.file_name());
        match write_text_file(&path, &sbom.content) {
            Ok(()) => add_artifact(
                &mut output.report,
                ArtifactPointer {
                    artifact_type: ArtifactType::Sbom,
                    path: path.to_string(),
                    format: Some(sbom.format.as_str().to_string()),
                },
            ),
            Err(err) => {
                let message = format!("write {path}: {err:#}");
                warn!(error = %message, "sbom not written");
                add_warning(
                    &mut output.report,
                    Warning::new(
                        ids::CODE_SBOM_FORMAT_ERROR,
                        format!("sbom:{}", sbom.format),
                        message,
                    ),
                );
            }
        }
    }

    let renderable = to_renderable(&output.report);
    for format in &output.outputs {
        let (path, written, artifact_type, name) = match format {
            OutputFormat::Json => {
                let path = args.out_dir.join("findings.json");
                let written = serialize_findings(&output.report)
                    .and_then(|data| write_bytes_file(&path, &data));
                (path, written, ArtifactType::Findings, "json")
            }
            OutputFormat::Markdown => {
                let path = args.out_dir.join("comment.md");
                let written = write_text_file(&path, &render_markdown(&renderable));
                (path, written, ArtifactType::Markdown, "markdown")
            }
            OutputFormat::Gha => {
                for annotation in render_annotations(&renderable, args.max_annotations) {
                    println!("{}", annotation);
                }
                continue;
            }
        };
        match written {
            Ok(()) => add_artifact(
                &mut output.report,
                ArtifactPointer {
                    artifact_type,
                    path: path.to_string(),
                    format: Some(name.to_string()),
                },
            ),
            Err(err) => {
                let message = format!("write {path}: {err:#}");
                warn!(error = %message, "output not written");
                add_warning(
                    &mut output.report,
                    Warning::new(
                        ids::CODE_OUTPUT_FORMAT_ERROR,
                        format!("output:{name}"),
                        message,
                    ),
                );
            }
        }
    }
}

fn write_report_file(path: &Utf8Path, report: &ScangateReport) -> anyhow::Result<()> {
    let data = serialize_report(report).context("serialize report")?;
    write_bytes_file(path, &data).with_context(|| format!("write report: {}", path))
}

fn write_text_file(path: &Utf8Path, text: &str) -> anyhow::Result<()> {
    write_bytes_file(path, text.as_bytes())
}

fn write_bytes_file(path: &Utf8Path, data: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {}", parent))?;
    }
    std::fs::write(path, data).with_context(|| format!("write file: {}", path))?;
    Ok(())
}

fn read_report(report_path: &Utf8Path) -> anyhow::Result<ScangateReport> {
    let report_text = std::fs::read_to_string(report_path)
        .with_context(|| format!("read report: {}", report_path))?;
    parse_report_json(&report_text)
}

fn cmd_md(report_path: &Utf8Path, output: Option<&Utf8Path>) -> anyhow::Result<()> {
    let report = read_report(report_path)?;
    let md = render_markdown(&to_renderable(&report));

    if let Some(out_path) = output {
        write_text_file(out_path, &md).context("write markdown output")?;
    } else {
        print!("{}", md);
    }

    Ok(())
}

fn cmd_annotations(report_path: &Utf8Path, max: usize) -> anyhow::Result<()> {
    let report = read_report(report_path)?;
    for annotation in render_annotations(&to_renderable(&report), max) {
        println!("{}", annotation);
    }
    Ok(())
}

fn cmd_explain(identifier: &str) -> anyhow::Result<()> {
    match run_explain(identifier) {
        ExplainOutput::Found {
            identifier,
            kind,
            explanation,
        } => {
            print!(
                "{}",
                scangate_app::format_explanation(&identifier, &kind, &explanation)
            );
            Ok(())
        }
        ExplainOutput::NotFound {
            identifier,
            available_rule_ids,
            available_codes,
        } => {
            eprint!(
                "{}",
                scangate_app::format_not_found(&identifier, available_rule_ids, available_codes)
            );
            std::process::exit(1);
        }
    }
}
