#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderableSeverity {
    Notice,
    Warning,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderableVerdictStatus {
    Pass,
    Warn,
    Fail,
    Skip,
}

/// A violation or run warning, flattened for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableItem {
    pub severity: RenderableSeverity,
    pub rule_id: Option<String>,
    pub code: String,
    pub message: String,
    /// Repo-relative file the item is about. Drives annotation placement.
    pub path: Option<String>,
    /// Package URL the item is about.
    pub package: Option<String>,
    pub help: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderableData {
    pub findings_total: u32,
    pub license_findings: u32,
    pub vulnerability_findings: u32,
    pub packages_scanned: u32,
    pub pipelines_completed: Vec<String>,
    pub enforced: bool,
    pub policy_conflicts: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableReport {
    pub verdict: RenderableVerdictStatus,
    pub violations: Vec<RenderableItem>,
    pub warnings: Vec<RenderableItem>,
    pub data: RenderableData,
}
