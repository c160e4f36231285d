//! Shared test utilities for the scangate workspace.
//!
//! `xtask` needs `normalize_nondeterministic` at runtime (not behind `#[cfg(test)]`),
//! so it lives in its own crate.

use serde_json::Value;

pub const TIMESTAMP_PLACEHOLDER: &str = "__TIMESTAMP__";
pub const VERSION_PLACEHOLDER: &str = "__VERSION__";

/// Normalize non-deterministic JSON fields for golden-file comparison.
///
/// 1. **Root-only**: `tool.version` is replaced when the root looks like a report envelope
///    (`schema`, `tool`, `run`, `verdict`, `findings`). Nested objects of the same shape,
///    such as package data, are left alone.
///
/// 2. **Recursive**: run timestamps (`started_at`, `ended_at`), `duration_ms`, and the SBOM
///    creation times (CycloneDX `timestamp`, SPDX `created`) are normalized at any depth.
pub fn normalize_nondeterministic(mut value: Value) -> Value {
    if let Some(obj) = value.as_object_mut() {
        let is_envelope = obj.contains_key("schema")
            && obj.contains_key("tool")
            && obj.contains_key("run")
            && obj.contains_key("verdict")
            && obj.contains_key("findings");
        if is_envelope
            && let Some(tool) = obj.get_mut("tool")
            && let Some(tool_obj) = tool.as_object_mut()
            && tool_obj.contains_key("name")
            && tool_obj.contains_key("version")
        {
            tool_obj.insert(
                "version".to_string(),
                Value::String(VERSION_PLACEHOLDER.to_string()),
            );
        }
    }
    normalize_timestamps_recursive(&mut value);
    value
}

const TIMESTAMP_KEYS: &[&str] = &["started_at", "ended_at", "timestamp", "created"];

fn normalize_timestamps_recursive(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for key in TIMESTAMP_KEYS {
                if let Some(v) = map.get_mut(*key)
                    && v.is_string()
                {
                    *v = Value::String(TIMESTAMP_PLACEHOLDER.to_string());
                }
            }
            if map.contains_key("duration_ms") {
                map.insert("duration_ms".to_string(), Value::Number(0.into()));
            }
            for val in map.values_mut() {
                normalize_timestamps_recursive(val);
            }
        }
        Value::Array(arr) => {
            for val in arr.iter_mut() {
                normalize_timestamps_recursive(val);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_only_touches_envelope_tool_version() {
        let input = json!({
            "schema": "scangate.report.v1",
            "tool": { "name": "scangate", "version": "0.1.0" },
            "run": { "started_at": "2026-01-01T00:00:00Z", "ended_at": "2026-01-01T00:00:01Z", "duration_ms": 1000 },
            "verdict": { "status": "pass" },
            "findings": [
                { "subject": { "package": "pkg:cargo/serde@1.0.0" }, "tool": "scancode.io" }
            ],
            "data": { "tool": { "name": "scancode", "version": "34.9.0" } }
        });

        let result = normalize_nondeterministic(input);

        assert_eq!(result["tool"]["version"], VERSION_PLACEHOLDER);
        assert_eq!(result["tool"]["name"], "scangate");
        assert_eq!(result["run"]["started_at"], TIMESTAMP_PLACEHOLDER);
        assert_eq!(result["run"]["ended_at"], TIMESTAMP_PLACEHOLDER);
        assert_eq!(result["run"]["duration_ms"], 0);
        assert_eq!(result["data"]["tool"]["version"], "34.9.0");
    }

    #[test]
    fn sbom_creation_times_are_normalized() {
        let cdx = json!({
            "bomFormat": "CycloneDX",
            "metadata": { "timestamp": "2026-03-01T10:00:00Z", "tools": { "components": [ { "name": "scangate", "version": "0.1.0" } ] } }
        });
        let spdx = json!({
            "spdxVersion": "SPDX-2.3",
            "creationInfo": { "created": "2026-03-01T10:00:00Z", "creators": ["Tool: scangate-0.1.0"] }
        });

        let cdx = normalize_nondeterministic(cdx);
        let spdx = normalize_nondeterministic(spdx);

        assert_eq!(cdx["metadata"]["timestamp"], TIMESTAMP_PLACEHOLDER);
        assert_eq!(cdx["metadata"]["tools"]["components"][0]["version"], "0.1.0");
        assert_eq!(spdx["creationInfo"]["created"], TIMESTAMP_PLACEHOLDER);
    }

    #[test]
    fn non_string_timestamp_keys_are_kept() {
        let input = json!({ "created": 3, "items": [ { "timestamp": null } ] });
        let result = normalize_nondeterministic(input.clone());
        assert_eq!(result, input);
    }
}
