use scangate_types::{ids, Warning};

/// Report surfaces beyond the always-written `report.json`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// `findings.json`: the raw findings array.
    Json,
    /// `comment.md`: a PR-comment friendly summary.
    Markdown,
    /// GitHub Actions annotations on stdout.
    Gha,
}

impl OutputFormat {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "markdown" | "md" => Some(OutputFormat::Markdown),
            "gha" | "github" | "annotations" => Some(OutputFormat::Gha),
            _ => None,
        }
    }
}

/// Parse requested output formats. Unknown names become warnings; duplicates collapse.
pub fn parse_output_formats(names: &[String]) -> (Vec<OutputFormat>, Vec<Warning>) {
    let mut formats = Vec::new();
    let mut warnings = Vec::new();
    for name in names {
        match OutputFormat::parse(name) {
            Some(f) if !formats.contains(&f) => formats.push(f),
            Some(_) => {}
            None => warnings.push(Warning::new(
                ids::CODE_OUTPUT_FORMAT_ERROR,
                format!("output:{name}"),
                format!("unknown output format '{name}' (expected json|markdown|gha)"),
            )),
        }
    }
    (formats, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_formats_warn_and_duplicates_collapse() {
        let names: Vec<String> = ["json", "md", "JSON", "sarif"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let (formats, warnings) = parse_output_formats(&names);
        assert_eq!(formats, vec![OutputFormat::Json, OutputFormat::Markdown]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].component, "output:sarif");
    }
}
