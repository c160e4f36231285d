//! Developer tasks (schema generation, explain coverage, golden-file normalization).
//!
//! Keeping this separate avoids bloating the end-user CLI.

use anyhow::{Context, bail};
use schemars::schema_for;
use scangate_test_util::normalize_nondeterministic;
use scangate_types::explain;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the project root (parent of xtask directory).
fn project_root() -> anyhow::Result<PathBuf> {
    let manifest_dir = match std::env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => std::env::current_dir().context("determine current directory")?,
    };

    if manifest_dir.ends_with("xtask")
        && let Some(parent) = manifest_dir.parent()
    {
        return Ok(parent.to_path_buf());
    }
    Ok(manifest_dir)
}

fn schemas_dir() -> anyhow::Result<PathBuf> {
    Ok(project_root()?.join("schemas"))
}

/// Schema definition with its target filename.
struct SchemaSpec {
    filename: &'static str,
    generate: fn() -> schemars::Schema,
}

fn generate_report_schema() -> schemars::Schema {
    schema_for!(scangate_types::ScangateReport)
}

fn generate_policy_schema() -> schemars::Schema {
    schema_for!(scangate_settings::PolicyFileV1)
}

fn generate_config_schema() -> schemars::Schema {
    schema_for!(scangate_settings::RunConfigV1)
}

fn schema_specs() -> Vec<SchemaSpec> {
    vec![
        SchemaSpec {
            filename: "scangate.report.v1.json",
            generate: generate_report_schema,
        },
        SchemaSpec {
            filename: "scangate.policy.v1.json",
            generate: generate_policy_schema,
        },
        SchemaSpec {
            filename: "scangate.config.v1.json",
            generate: generate_config_schema,
        },
    ]
}

/// Serialize a schema to pretty-printed JSON with trailing newline.
fn serialize_schema(schema: &schemars::Schema) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(schema).context("Failed to serialize schema")?;
    json.push('\n');
    Ok(json)
}

fn emit_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir()?;
    fs::create_dir_all(&dir).context("Failed to create schemas directory")?;

    for spec in schema_specs() {
        let json = serialize_schema(&(spec.generate)())?;
        let path = dir.join(spec.filename);
        fs::write(&path, &json)
            .with_context(|| format!("Failed to write schema to {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    println!("\nSchemas emitted successfully.");
    Ok(())
}

/// Validate that schemas in the repo match what would be generated.
fn validate_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir()?;
    let mut missing = Vec::new();
    let mut mismatched = Vec::new();

    for spec in schema_specs() {
        let path = dir.join(spec.filename);
        if !path.exists() {
            missing.push(spec.filename);
            continue;
        }

        let expected = serialize_schema(&(spec.generate)())?;
        let actual = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if expected != actual {
            mismatched.push(spec.filename);
        }
    }

    if missing.is_empty() && mismatched.is_empty() {
        println!("All schemas are up to date.");
        return Ok(());
    }
    if !missing.is_empty() {
        eprintln!("Missing schemas:");
        for name in &missing {
            eprintln!("  - {}", name);
        }
    }
    if !mismatched.is_empty() {
        eprintln!("Schemas out of date:");
        for name in &mismatched {
            eprintln!("  - {}", name);
        }
    }
    eprintln!("\nRun `cargo xtask emit-schemas` to regenerate.");
    bail!("Schema validation failed")
}

/// Every rule id and code must have a complete explanation.
fn explain_coverage() -> anyhow::Result<()> {
    let rule_ids = explain::all_rule_ids();
    let codes = explain::all_codes();
    let mut errors = Vec::new();

    for (kind, ids) in [("Rule id", rule_ids), ("Code", codes)] {
        for id in ids {
            match explain::lookup_explanation(id) {
                Some(exp) => {
                    if exp.title.is_empty() {
                        errors.push(format!("{kind} '{id}' has empty title"));
                    }
                    if exp.description.is_empty() {
                        errors.push(format!("{kind} '{id}' has empty description"));
                    }
                    if exp.remediation.is_empty() {
                        errors.push(format!("{kind} '{id}' has empty remediation"));
                    }
                }
                None => errors.push(format!("{kind} '{id}' has no explanation")),
            }
        }
    }

    if errors.is_empty() {
        println!("{} rule ids have explanations", rule_ids.len());
        println!("{} codes have explanations", codes.len());
        return Ok(());
    }
    for error in &errors {
        eprintln!("  - {}", error);
    }
    bail!(
        "Explain coverage validation failed with {} errors",
        errors.len()
    )
}

/// Rewrite a report or SBOM JSON file with timestamps and tool version replaced by placeholders.
fn normalize_golden(path: &Path) -> anyhow::Result<()> {
    let text =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))?;
    let mut out = serde_json::to_string_pretty(&normalize_nondeterministic(value))
        .context("serialize normalized json")?;
    out.push('\n');
    fs::write(path, out).with_context(|| format!("write {}", path.display()))?;
    println!("Normalized {}", path.display());
    Ok(())
}

fn print_help() {
    eprintln!("xtask commands:");
    eprintln!("  help               Show this message");
    eprintln!("  emit-schemas       Generate JSON schemas from Rust types to schemas/");
    eprintln!("  validate-schemas   Check if schemas/ matches generated output (for CI)");
    eprintln!("  print-schema-ids   Print known schema IDs");
    eprintln!("  explain-coverage   Validate all rule ids and codes have explanations");
    eprintln!("  normalize <file>   Replace timestamps and versions in a golden JSON file");
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match cmd {
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        "emit-schemas" => emit_schemas(),
        "validate-schemas" => validate_schemas(),
        "explain-coverage" => explain_coverage(),
        "normalize" => match args.get(2) {
            Some(path) => normalize_golden(Path::new(path)),
            None => bail!("normalize requires a file path"),
        },
        "print-schema-ids" => {
            for spec in schema_specs() {
                println!("{}", spec.filename.trim_end_matches(".json"));
            }
            Ok(())
        }
        other => bail!("unknown xtask command: {other}\n\nRun `cargo xtask help` for usage."),
    }
    .context("xtask failed")
}
