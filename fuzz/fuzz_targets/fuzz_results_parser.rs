//! Fuzz target for ScanCode.io results parsing.
//!
//! Goal: parsing and finding extraction never panic. Errors are fine.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_results_parser
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use scangate_scan::ScanResults;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(results) = ScanResults::from_json(text) {
            let _ = results.resource_license_findings();
            let _ = results.package_license_findings();
            let _ = results.vulnerability_findings();
            let _ = results.package_records();
        }
    }
});
