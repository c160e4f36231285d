use crate::{results::Vulnerability, LookupOutcome, ScanError, VulnerabilityLookup};
use scangate_types::{Finding, Subject};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_BACKOFF_MS: u64 = 500;

/// HTTP client for a VulnerableCode-compatible package API.
///
/// Queries `GET {base}/api/packages/?purl=<purl>` once per package. Each request is retried
/// with linear backoff. The first request that exhausts its retries ends the lookup; findings
/// for packages answered before it are kept.
pub struct VulnerableCodeClient {
    base_url: String,
    retries: u32,
    backoff: Duration,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Default, Deserialize)]
struct PackagePage {
    #[serde(default)]
    results: Vec<ApiPackage>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiPackage {
    #[serde(default)]
    purl: Option<String>,
    #[serde(default)]
    affected_by_vulnerabilities: Vec<Vulnerability>,
}

impl VulnerableCodeClient {
    pub fn new(base_url: &str, retries: u32) -> Result<Self, ScanError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(DEFAULT_TIMEOUT_MS))
            .build()
            .map_err(|e| ScanError::UpstreamUnavailable {
                url: base_url.clone(),
                attempts: 0,
                message: e.to_string(),
            })?;
        Ok(Self {
            base_url,
            retries,
            backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
            client,
        })
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn package_url(&self, purl: &str) -> String {
        format!(
            "{}/api/packages/?purl={}",
            self.base_url,
            urlencoding::encode(purl)
        )
    }

    fn fetch(&self, purl: &str) -> Result<PackagePage, ScanError> {
        let url = self.package_url(purl);
        let attempts = self.retries.saturating_add(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.fetch_once(&url) {
                Ok(page) => return Ok(page),
                Err(e) => {
                    warn!(url = %url, attempt, attempts, error = %e, "vulnerability lookup failed");
                    last_error = e;
                }
            }
            if attempt < attempts {
                std::thread::sleep(self.backoff * attempt);
            }
        }

        Err(ScanError::UpstreamUnavailable {
            url: self.base_url.clone(),
            attempts,
            message: last_error,
        })
    }

    fn fetch_once(&self, url: &str) -> Result<PackagePage, String> {
        let resp = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| e.to_string())?;
        resp.json::<PackagePage>().map_err(|e| e.to_string())
    }
}

impl VulnerabilityLookup for VulnerableCodeClient {
    fn lookup(&self, purls: &[String]) -> Result<LookupOutcome, ScanError> {
        let outcome = collect_pages(purls, |purl| self.fetch(purl));
        debug!(
            packages = purls.len(),
            vulnerabilities = outcome.findings.len(),
            degraded = outcome.degraded.is_some(),
            "vulnerability lookup complete"
        );
        Ok(outcome)
    }
}

/// Fetch each purl in turn, stopping at the first failure but keeping earlier answers.
fn collect_pages<F>(purls: &[String], mut fetch: F) -> LookupOutcome
where
    F: FnMut(&str) -> Result<PackagePage, ScanError>,
{
    let mut outcome = LookupOutcome::default();
    for purl in purls {
        let page = match fetch(purl) {
            Ok(page) => page,
            Err(e) => {
                outcome.degraded = Some(e);
                break;
            }
        };
        for package in page.results {
            // The service may answer with a normalized purl; keep the one we asked about.
            let subject_purl = package.purl.unwrap_or_else(|| purl.clone());
            for v in &package.affected_by_vulnerabilities {
                if let Some(f) = v.to_lookup_finding(Subject::package(subject_purl.clone())) {
                    outcome.findings.push(f);
                }
            }
        }
    }
    outcome
}
