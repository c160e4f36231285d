//! In-memory [`Scanner`] and [`VulnerabilityLookup`] for tests.

use crate::{LookupOutcome, Pipeline, PipelineOutput, ScanError, Scanner, VulnerabilityLookup};
use camino::Utf8Path;
use scangate_types::Finding;
use std::collections::HashMap;
use std::sync::Mutex;

/// Returns canned output per pipeline. Pipelines without an entry produce nothing.
#[derive(Default)]
pub struct FakeScanner {
    outputs: HashMap<Pipeline, Result<PipelineOutput, ScanError>>,
    calls: Mutex<Vec<Pipeline>>,
}

impl FakeScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, pipeline: Pipeline, output: PipelineOutput) -> Self {
        self.outputs.insert(pipeline, Ok(output));
        self
    }

    pub fn with_failure(mut self, pipeline: Pipeline, error: ScanError) -> Self {
        self.outputs.insert(pipeline, Err(error));
        self
    }

    /// Pipelines run so far, in call order.
    pub fn calls(&self) -> Vec<Pipeline> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Scanner for FakeScanner {
    fn run_pipeline(
        &self,
        pipeline: Pipeline,
        _source: &Utf8Path,
    ) -> Result<PipelineOutput, ScanError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(pipeline);
        }
        self.outputs
            .get(&pipeline)
            .cloned()
            .unwrap_or_else(|| Ok(PipelineOutput::default()))
    }
}

/// Returns fixed findings, or reports the service as unavailable.
#[derive(Default)]
pub struct FakeLookup {
    findings: Vec<Finding>,
    /// Number of purls answered before the service goes away.
    answered: Option<usize>,
    queried: Mutex<Vec<String>>,
}

impl FakeLookup {
    pub fn with_findings(findings: Vec<Finding>) -> Self {
        Self {
            findings,
            ..Self::default()
        }
    }

    pub fn unavailable() -> Self {
        Self::default().unavailable_after(0)
    }

    /// Answer the first `n` purls, then report the service as unavailable.
    pub fn unavailable_after(mut self, n: usize) -> Self {
        self.answered = Some(n);
        self
    }

    /// Every purl passed to [`VulnerabilityLookup::lookup`].
    pub fn queried(&self) -> Vec<String> {
        self.queried.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

impl VulnerabilityLookup for FakeLookup {
    fn lookup(&self, purls: &[String]) -> Result<LookupOutcome, ScanError> {
        let mut outcome = LookupOutcome::default();
        for (i, purl) in purls.iter().enumerate() {
            if self.answered.is_some_and(|n| i >= n) {
                outcome.degraded = Some(ScanError::UpstreamUnavailable {
                    url: "fake://vulnerablecode".to_string(),
                    attempts: 1,
                    message: "connection refused".to_string(),
                });
                break;
            }
            if let Ok(mut q) = self.queried.lock() {
                q.push(purl.clone());
            }
            outcome.findings.extend(
                self.findings
                    .iter()
                    .filter(|f| f.subject.as_package() == Some(purl.as_str()))
                    .cloned(),
            );
        }
        Ok(outcome)
    }
}
