//! Fuzz target for policy documents and run configuration.
//!
//! Goal: malformed input is a `PolicyLoadError` or a config error, never a panic.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_policy_parser
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use scangate_settings::{parse_policy, resolve_policy};

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(doc) = parse_policy(text, None) {
            let _ = resolve_policy(&doc, false);
        }
        let _ = scangate_settings::parse_run_config_toml(text);
    }
});
