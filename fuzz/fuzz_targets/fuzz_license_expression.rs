//! Fuzz target for ScanCode to SPDX license expression mapping.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_license_expression
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = scangate_sbom::license::spdx_expression(text);
        let _ = scangate_sbom::license::license_refs(text);
    }
});
