//! The `explain` use case: describe a rule id or code and where it is configured.

use scangate_types::explain::{self, Explanation};
use scangate_types::ids;

/// Rule ids and the violation codes they emit.
const RULE_CODES: &[(&str, &[&str])] = &[
    (ids::RULE_LICENSE_PROHIBITED, &[ids::CODE_PROHIBITED_LICENSE]),
    (ids::RULE_LICENSE_NOT_ALLOWED, &[ids::CODE_LICENSE_NOT_ALLOWED]),
    (
        ids::RULE_VULNERABILITY_MAXIMUM_SEVERITY,
        &[ids::CODE_SEVERITY_EXCEEDS_MAXIMUM],
    ),
    (ids::RULE_VULNERABILITY_PRESENT, &[ids::CODE_VULNERABILITY_FOUND]),
];

/// What an identifier names in a report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdentifierKind {
    /// A policy rule, with the violation codes it emits.
    Rule { codes: &'static [&'static str] },
    /// A violation code and the rule that emits it.
    ViolationCode { rule: &'static str },
    /// A run warning. Never a violation on its own.
    WarningCode,
}

impl IdentifierKind {
    fn of(identifier: &str) -> Self {
        for &(rule, codes) in RULE_CODES {
            if rule == identifier {
                return IdentifierKind::Rule { codes };
            }
            if codes.iter().any(|c| *c == identifier) {
                return IdentifierKind::ViolationCode { rule };
            }
        }
        IdentifierKind::WarningCode
    }
}

/// Output from the explain use case.
#[derive(Clone, Debug)]
pub enum ExplainOutput {
    Found {
        identifier: String,
        kind: IdentifierKind,
        explanation: Explanation,
    },
    /// Unknown identifier; includes available rule ids and codes.
    NotFound {
        identifier: String,
        available_rule_ids: &'static [&'static str],
        available_codes: &'static [&'static str],
    },
}

/// Look up an explanation for a rule id or code.
pub fn run_explain(identifier: &str) -> ExplainOutput {
    let identifier = identifier.trim();
    match explain::lookup_explanation(identifier) {
        Some(explanation) => ExplainOutput::Found {
            identifier: identifier.to_string(),
            kind: IdentifierKind::of(identifier),
            explanation,
        },
        None => ExplainOutput::NotFound {
            identifier: identifier.to_string(),
            available_rule_ids: explain::all_rule_ids(),
            available_codes: explain::all_codes(),
        },
    }
}

/// Format an explanation for terminal display.
pub fn format_explanation(identifier: &str, kind: &IdentifierKind, exp: &Explanation) -> String {
    let mut out = String::new();

    out.push_str(exp.title);
    out.push('\n');
    out.push_str(&"=".repeat(exp.title.len()));
    out.push_str("\n\n");

    match kind {
        IdentifierKind::Rule { codes } => {
            out.push_str(&format!(
                "Rule `{identifier}`, reported with code {}.\n\n",
                codes.join(", ")
            ));
        }
        IdentifierKind::ViolationCode { rule } => {
            out.push_str(&format!(
                "Violation code `{identifier}`, emitted by rule `{rule}`.\n\n"
            ));
        }
        IdentifierKind::WarningCode => {
            out.push_str(&format!(
                "Warning code `{identifier}`. Recorded on the report; \
                 does not change the exit code by itself.\n\n"
            ));
        }
    }

    out.push_str(exp.description);
    out.push_str("\n\n");
    out.push_str("Remediation\n");
    out.push_str("-----------\n");
    out.push_str(exp.remediation);
    out.push_str("\n\n");
    push_example(&mut out, "Before", exp.examples.before);
    out.push('\n');
    push_example(&mut out, "After", exp.examples.after);

    out
}

/// Policies are JSON documents; everything else in the registry is `scangate.toml`.
fn push_example(out: &mut String, heading: &str, example: &str) {
    let (source, lang) = if example.trim_start().starts_with('{') {
        ("policy", "json")
    } else {
        ("scangate.toml", "toml")
    };
    out.push_str(&format!("{heading} ({source}):\n```{lang}\n"));
    out.push_str(example);
    out.push_str("\n```\n");
}

/// Known identifiers that look like `identifier`: same namespace, or sharing a substring.
fn suggestions(
    identifier: &str,
    rule_ids: &[&'static str],
    codes: &[&'static str],
) -> Vec<&'static str> {
    let needle = identifier.to_ascii_lowercase().replace('-', "_");
    let namespace = needle.split('.').next().unwrap_or_default();
    rule_ids
        .iter()
        .chain(codes)
        .copied()
        .filter(|known| {
            !needle.is_empty()
                && (known.contains(needle.as_str())
                    || needle.contains(*known)
                    || (!namespace.is_empty() && known.starts_with(&format!("{namespace}."))))
        })
        .collect()
}

/// Format the "not found" error message for terminal display.
pub fn format_not_found(
    identifier: &str,
    rule_ids: &[&'static str],
    codes: &[&'static str],
) -> String {
    let mut out = String::new();

    out.push_str(&format!("Unknown rule id or code: {}\n\n", identifier));
    let close = suggestions(identifier, rule_ids, codes);
    if !close.is_empty() {
        out.push_str(&format!("Did you mean: {}\n\n", close.join(", ")));
    }
    out.push_str("Rule ids (violations):\n");
    for id in rule_ids {
        out.push_str(&format!("  - {}\n", id));
    }
    out.push_str("\nCodes:\n");
    for code in codes {
        out.push_str(&format!("  - {}\n", code));
    }

    out
}
