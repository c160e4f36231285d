//! Render use cases: markdown and GitHub annotations from in-memory reports.

use scangate_render::RenderableReport;

pub fn render_markdown(report: &RenderableReport) -> String {
    scangate_render::render_markdown(report)
}

pub fn render_annotations(report: &RenderableReport, max: usize) -> Vec<String> {
    scangate_render::render_github_annotations(report)
        .into_iter()
        .take(max)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scangate_render::{
        RenderableData, RenderableItem, RenderableSeverity, RenderableVerdictStatus,
    };

    fn sample_report() -> RenderableReport {
        let item = RenderableItem {
            severity: RenderableSeverity::Error,
            rule_id: Some("license.prohibited".to_string()),
            code: "prohibited_license".to_string(),
            message: "bad".to_string(),
            path: Some("src/a.c".to_string()),
            package: None,
            help: None,
        };
        RenderableReport {
            verdict: RenderableVerdictStatus::Fail,
            violations: vec![item.clone(), item],
            warnings: Vec::new(),
            data: RenderableData::default(),
        }
    }

    #[test]
    fn render_annotations_respects_max() {
        let report = sample_report();
        let annotations = render_annotations(&report, 1);
        assert_eq!(annotations.len(), 1);
    }

    #[test]
    fn render_markdown_smoke() {
        let report = sample_report();
        let markdown = render_markdown(&report);
        assert!(markdown.contains("## Violations"));
    }
}
