use crate::{RenderableItem, RenderableReport, RenderableSeverity};

/// Render violations, then warnings, as GitHub Actions workflow command annotations.
///
/// Format:
/// `::{level} file={path}::{message}`
///
/// Items about a package (no file) are emitted without a location.
pub fn render_github_annotations(report: &RenderableReport) -> Vec<String> {
    report
        .violations
        .iter()
        .chain(report.warnings.iter())
        .map(annotation)
        .collect()
}

fn annotation(item: &RenderableItem) -> String {
    let level = match item.severity {
        RenderableSeverity::Error => "error",
        RenderableSeverity::Warning => "warning",
        RenderableSeverity::Notice => "notice",
    };

    let rule = item.rule_id.as_deref().unwrap_or("scangate");
    let message = escape_data(&format!("[{}:{}] {}", rule, item.code, item.message));

    match &item.path {
        Some(path) => format!("::{} file={}::{}", level, escape_property(path), message),
        None => format!("::{}::{}", level, message),
    }
}

fn escape_data(s: &str) -> String {
    s.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}
