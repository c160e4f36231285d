use crate::ScanError;
use scangate_types::{ids, Finding, PackageRecord};

/// A named scan pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pipeline {
    /// License detections per file, plus the package inventory.
    ScanCodebase,
    /// Package inventory and declared licenses.
    InspectPackages,
    /// Vulnerabilities affecting the inventory.
    FindVulnerabilities,
}

impl Pipeline {
    pub const ALL: [Pipeline; 3] = [
        Pipeline::ScanCodebase,
        Pipeline::InspectPackages,
        Pipeline::FindVulnerabilities,
    ];

    pub fn parse(name: &str) -> Result<Self, ScanError> {
        match name.trim() {
            ids::PIPELINE_SCAN_CODEBASE => Ok(Pipeline::ScanCodebase),
            ids::PIPELINE_INSPECT_PACKAGES => Ok(Pipeline::InspectPackages),
            ids::PIPELINE_FIND_VULNERABILITIES => Ok(Pipeline::FindVulnerabilities),
            other => Err(ScanError::UnknownPipeline(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Pipeline::ScanCodebase => ids::PIPELINE_SCAN_CODEBASE,
            Pipeline::InspectPackages => ids::PIPELINE_INSPECT_PACKAGES,
            Pipeline::FindVulnerabilities => ids::PIPELINE_FIND_VULNERABILITIES,
        }
    }
}

impl std::fmt::Display for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one pipeline produced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PipelineOutput {
    pub findings: Vec<Finding>,
    pub packages: Vec<PackageRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for p in Pipeline::ALL {
            assert_eq!(Pipeline::parse(p.as_str()), Ok(p));
        }
    }

    #[test]
    fn unknown_name_is_an_execution_error() {
        let err = Pipeline::parse("scan_everything").unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.warning_code(), ids::CODE_SCAN_EXECUTION_ERROR);
    }
}
